//! SMBIOS Type 38 record builder
//!
//! Locates the SMBIOS registration service, asks the BMC for its IPMI version, merges it with the platform
//! configuration and submits the finished record. Any collaborator failure ends the sequence immediately and nothing
//! is submitted.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use r_efi::efi;

use crate::{
    config::IpmiSmbiosConfig,
    error::IpmiSmbiosError,
    ipmi::IpmiCommands,
    service::{SmbiosLocator, SmbiosRegistration},
    smbios_record::{SMBIOS_HANDLE_PI_RESERVED, SmbiosHandle, SmbiosTableType38},
};

/// Creates a Type 38 record holding every field that comes from platform configuration.
pub fn populate_static_fields(config: &IpmiSmbiosConfig) -> SmbiosTableType38 {
    let mut record = SmbiosTableType38::new();
    record.apply_config(config);
    record
}

/// Builds the IPMI Device Information record and registers it.
///
/// Returns the handle the registration service assigned to the record.
pub fn build_and_register<L, I>(
    locator: &L,
    ipmi: &I,
    config: &IpmiSmbiosConfig,
) -> Result<SmbiosHandle, IpmiSmbiosError>
where
    L: SmbiosLocator + ?Sized,
    I: IpmiCommands + ?Sized,
{
    let smbios = locator.locate().map_err(|status| {
        log::error!("IPMI SMBIOS: failed to locate the SMBIOS protocol. Status = {:#x?}", status);
        IpmiSmbiosError::ServiceUnavailable(status)
    })?;

    let mut record = populate_static_fields(config);

    let device_id = ipmi.get_device_id().map_err(|status| {
        log::error!("IPMI SMBIOS: Get Device ID failed. Status = {:#x?}", status);
        IpmiSmbiosError::IdentityQueryFailed(status)
    })?;

    record.ipmi_specification_revision = device_id.specification_version;
    log::debug!("IPMI SMBIOS: assembled Type 38 record {:x?}", record);

    let mut handle = SMBIOS_HANDLE_PI_RESERVED;
    smbios.add(None, &mut handle, &record.to_bytes()).map_err(|status| {
        log::error!("IPMI SMBIOS: failed to add the Type 38 record. Status = {:#x?}", status);
        IpmiSmbiosError::RegistrationRejected(status)
    })?;

    log::info!(
        "IPMI SMBIOS: published Type 38 record with handle {:#06x} (IPMI {}.{}).",
        handle,
        device_id.ipmi_major_version(),
        device_id.ipmi_minor_version()
    );

    Ok(handle)
}

/// Status-returning form of [`build_and_register`] for callers that only consume an `efi::Status`.
pub fn create_ipmi_smbios_type38<L, I>(locator: &L, ipmi: &I, config: &IpmiSmbiosConfig) -> efi::Status
where
    L: SmbiosLocator + ?Sized,
    I: IpmiCommands + ?Sized,
{
    match build_and_register(locator, ipmi, config) {
        Ok(_) => efi::Status::SUCCESS,
        Err(error) => error.into(),
    }
}
