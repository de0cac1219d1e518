//! SMBIOS registration service interfaces
//!
//! The narrow view of the SMBIOS table producer this component needs: find it, then hand it a record.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(test)]
use mockall::automock;
use r_efi::efi;

use crate::smbios_record::SmbiosHandle;

/// Adds records to the SMBIOS table.
#[cfg_attr(test, automock)]
pub trait SmbiosRegistration {
    /// Adds an SMBIOS record to the SMBIOS table.
    ///
    /// `record` is the complete record image, header first and terminated by its string set. If `smbios_handle` is
    /// `SMBIOS_HANDLE_PI_RESERVED` a unique handle is assigned and written back.
    fn add(
        &self,
        producer_handle: Option<efi::Handle>,
        smbios_handle: &mut SmbiosHandle,
        record: &[u8],
    ) -> Result<(), efi::Status>;
}

/// Finds the SMBIOS registration service.
#[cfg_attr(test, automock(type Registration = MockSmbiosRegistration;))]
pub trait SmbiosLocator {
    /// The registration service handed out on success.
    type Registration: SmbiosRegistration;

    /// Locates the registration service, typically by protocol GUID.
    fn locate(&self) -> Result<Self::Registration, efi::Status>;
}
