//! IPMI SMBIOS Component Configuration
//!
//! Platform constants describing how the BMC's in-band IPMI interface is wired. None of these values are reported by
//! the BMC itself, so the platform must provide them.
//!
//! ## Static Configuration Example
//!
//! ```rust,ignore
//! // ...
//!
//! Core::default()
//! // ...
//!
//! .with_config(patina_ipmi_smbios::config::IpmiSmbiosConfig {
//!     interface_type: patina_ipmi_smbios::config::InterfaceType::Ssif,
//!     i2c_slave_address: 0x10,
//!     base_address: 0x20,
//!     address_space: patina_ipmi_smbios::config::AddressSpace::Memory,
//!     ..Default::default()
//! })
//! .with_component(patina_ipmi_smbios::component::IpmiSmbiosType38::new())
//! .start()
//! .unwrap();
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Default: KCS is the interface nearly every server BMC exposes.
pub const DEFAULT_INTERFACE_TYPE: InterfaceType = InterfaceType::Kcs;
/// Default: the IPMB address of the BMC.
pub const DEFAULT_I2C_SLAVE_ADDRESS: u8 = 0x20;
/// Default: no NV storage device.
pub const DEFAULT_NV_STORAGE_DEVICE_ADDRESS: u8 = 0xFF;
/// Default: KCS data register at I/O port 0xCA2.
pub const DEFAULT_BASE_ADDRESS: u64 = 0xCA2;

/// BMC interface type as encoded in the Type 38 `Interface Type` field.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    /// Unknown interface.
    Unknown = 0,
    /// Keyboard Controller Style.
    Kcs = 1,
    /// Server Management Interface Chip.
    Smic = 2,
    /// Block Transfer.
    Bt = 3,
    /// SMBus System Interface.
    Ssif = 4,
}

impl From<InterfaceType> for u8 {
    fn from(interface_type: InterfaceType) -> Self {
        interface_type as u8
    }
}

/// Address space the `Base Address` field refers to. The value is stored in bit 0 of the base address.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpace {
    /// Memory-mapped registers.
    Memory = 0,
    /// I/O-mapped registers.
    Io = 1,
}

impl AddressSpace {
    /// The single bit encoding of this address space.
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

/// The configuration for the IPMI SMBIOS component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpmiSmbiosConfig {
    /// Which system interface the BMC exposes.
    pub interface_type: InterfaceType,
    /// Slave address of the BMC on the I2C bus.
    pub i2c_slave_address: u8,
    /// Bus address of the NV storage device, or 0xFF when there is none.
    pub nv_storage_device_address: u8,
    /// Base address of the interface registers.
    ///
    /// Bit 0 of the record's base address holds the address space instead, so bit 0 of this value is reported in
    /// bit 4 of the modifier byte.
    pub base_address: u64,
    /// Whether `base_address` is an I/O or memory address.
    pub address_space: AddressSpace,
    /// Whether the interrupt fields describe a wired interrupt.
    pub interrupt_info_valid: bool,
    /// Interrupt polarity, 1 = active high. Only bit 0 is used.
    pub interrupt_polarity: u8,
    /// Interrupt trigger mode, 1 = level. Only bit 0 is used.
    pub interrupt_trigger_mode: u8,
    /// Interrupt line, 0 when the interface does not use an interrupt.
    pub interrupt_number: u8,
}

impl Default for IpmiSmbiosConfig {
    fn default() -> Self {
        Self {
            interface_type: DEFAULT_INTERFACE_TYPE,
            i2c_slave_address: DEFAULT_I2C_SLAVE_ADDRESS,
            nv_storage_device_address: DEFAULT_NV_STORAGE_DEVICE_ADDRESS,
            base_address: DEFAULT_BASE_ADDRESS,
            address_space: AddressSpace::Io,
            interrupt_info_valid: false,
            interrupt_polarity: 0,
            interrupt_trigger_mode: 0,
            interrupt_number: 0,
        }
    }
}
