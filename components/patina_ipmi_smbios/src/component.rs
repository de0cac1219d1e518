//! IPMI SMBIOS Component
//!
//! Publishes the SMBIOS Type 38 record describing the BMC's in-band IPMI interface.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use patina_sdk::{
    boot_services::StandardBootServices,
    component::{IntoComponent, params::Config},
    error::{EfiError, Result},
};

use crate::{
    builder,
    config::IpmiSmbiosConfig,
    ipmi::IpmiCommands,
    protocol::{BootServicesIpmiTransport, BootServicesSmbiosLocator},
    service::SmbiosLocator,
    smbios_record::SmbiosHandle,
};

/// The component that adds the IPMI Device Information record to the SMBIOS table.
#[derive(IntoComponent, Default)]
pub struct IpmiSmbiosType38;

impl IpmiSmbiosType38 {
    pub fn new() -> Self {
        Self
    }

    /// Entry point of [`IpmiSmbiosType38`]
    fn entry_point(self, config: Config<IpmiSmbiosConfig>, boot_services: StandardBootServices) -> Result<()> {
        let locator = BootServicesSmbiosLocator::new(StandardBootServices::clone(&boot_services));
        let ipmi = BootServicesIpmiTransport::new(boot_services);
        self._entry_point(&config, &locator, &ipmi).map(|_| ())
    }

    /// Entry point over generic collaborators.
    fn _entry_point<L, I>(self, config: &IpmiSmbiosConfig, locator: &L, ipmi: &I) -> Result<SmbiosHandle>
    where
        L: SmbiosLocator,
        I: IpmiCommands,
    {
        builder::build_and_register(locator, ipmi, config).map_err(EfiError::from)
    }
}
