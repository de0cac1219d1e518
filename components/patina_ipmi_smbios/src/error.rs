//! Error types for IPMI SMBIOS record publication
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_sdk::error::EfiError;
use r_efi::efi;

/// The stage at which publishing the Type 38 record failed.
///
/// Every variant carries the status the failing collaborator reported, unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpmiSmbiosError {
    /// The SMBIOS registration service could not be located.
    ServiceUnavailable(efi::Status),
    /// The BMC did not answer Get Device ID.
    IdentityQueryFailed(efi::Status),
    /// The SMBIOS registration service rejected the record.
    RegistrationRejected(efi::Status),
}

impl IpmiSmbiosError {
    /// The collaborator status behind this error.
    pub fn status(&self) -> efi::Status {
        match self {
            IpmiSmbiosError::ServiceUnavailable(status)
            | IpmiSmbiosError::IdentityQueryFailed(status)
            | IpmiSmbiosError::RegistrationRejected(status) => *status,
        }
    }
}

impl From<IpmiSmbiosError> for efi::Status {
    fn from(error: IpmiSmbiosError) -> Self {
        error.status()
    }
}

impl From<IpmiSmbiosError> for EfiError {
    fn from(error: IpmiSmbiosError) -> Self {
        match error.status() {
            efi::Status::NOT_FOUND => EfiError::NotFound,
            efi::Status::NOT_READY => EfiError::NotReady,
            efi::Status::TIMEOUT => EfiError::Timeout,
            efi::Status::INVALID_PARAMETER => EfiError::InvalidParameter,
            efi::Status::OUT_OF_RESOURCES => EfiError::OutOfResources,
            efi::Status::UNSUPPORTED => EfiError::Unsupported,
            efi::Status::BUFFER_TOO_SMALL => EfiError::BufferTooSmall,
            efi::Status::ALREADY_STARTED => EfiError::AlreadyStarted,
            efi::Status::ACCESS_DENIED => EfiError::AccessDenied,
            _ => EfiError::DeviceError,
        }
    }
}
