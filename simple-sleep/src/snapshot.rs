// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Scoped save and restore of registers

use core::ops::Deref;
use core::ops::DerefMut;

use log::trace;

use heapless::Vec;

use crate::controller::LowPowerController;
use crate::controller::Register;

/// Registers saved on creation and restored when dropped
///
/// The snapshot borrows the controller and dereferences to it, so the
/// registers can be changed freely while it is alive.
pub struct RegisterSnapshot<'a, C>
where
    C: LowPowerController,
{
    /// Controller owning the registers
    controller: &'a mut C,

    /// Saved registers and their values
    saved: Vec<(Register, u8), { Register::COUNT }>,
}

impl<'a, C> RegisterSnapshot<'a, C>
where
    C: LowPowerController,
{
    /// Save the current value of `registers`
    ///
    /// Repeated registers are saved once.
    pub fn take(controller: &'a mut C, registers: &[Register]) -> Self {
        let mut saved: Vec<(Register, u8), { Register::COUNT }> = Vec::new();

        for &register in registers {
            if saved.iter().any(|&(other, _)| other == register) {
                continue;
            }
            let value = controller.read_register(register);
            trace!("Save {register:?} = {value:#04x}");
            if saved.push((register, value)).is_err() {
                break;
            }
        }

        Self { controller, saved }
    }

    /// Number of saved registers
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Check whether no register was saved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

impl<C> Deref for RegisterSnapshot<'_, C>
where
    C: LowPowerController,
{
    type Target = C;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<C> DerefMut for RegisterSnapshot<'_, C>
where
    C: LowPowerController,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl<C> Drop for RegisterSnapshot<'_, C>
where
    C: LowPowerController,
{
    fn drop(&mut self) {
        for &(register, value) in self.saved.iter().rev() {
            trace!("Restore {register:?} = {value:#04x}");
            self.controller.write_register(register, value);
        }
    }
}
