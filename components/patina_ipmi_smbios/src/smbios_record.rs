//! SMBIOS Type 38 record layout
//!
//! Binary definition of the IPMI Device Information structure (SMBIOS 3.x, section 7.39) and the helpers that derive
//! its address and interrupt fields from the platform configuration.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::mem::size_of;

use bitfield_struct::bitfield;
use zerocopy::IntoBytes;
use zerocopy_derive::{FromBytes, Immutable, IntoBytes as DeriveIntoBytes, KnownLayout};

use crate::config::IpmiSmbiosConfig;

/// SMBIOS record handle type (16-bit identifier)
pub type SmbiosHandle = u16;

/// SMBIOS record type
pub type SmbiosType = u8;

/// Reference SMBIOS 2.7, chapter 6.1.2.
/// The UEFI Platform Initialization Specification reserves handle number FFFEh for its
/// EFI_SMBIOS_PROTOCOL.Add() function to mean "assign an unused handle number automatically."
pub const SMBIOS_HANDLE_PI_RESERVED: SmbiosHandle = 0xFFFE;

/// IPMI Device Information (Type 38)
pub const SMBIOS_TYPE_IPMI_DEVICE_INFORMATION: SmbiosType = 38;

/// Size of the formatted area of a Type 38 record.
pub const SMBIOS_TYPE38_LENGTH: usize = size_of::<SmbiosTableType38>();

/// Size of the complete Type 38 record image: the formatted area plus the empty string-set terminator.
pub const SMBIOS_TYPE38_RECORD_SIZE: usize = SMBIOS_TYPE38_LENGTH + 2;

/// SMBIOS table header structure
///
/// The 4-byte header that appears at the start of every SMBIOS record.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, DeriveIntoBytes, Immutable, KnownLayout)]
pub struct SmbiosTableHeader {
    /// SMBIOS record type
    pub record_type: SmbiosType,
    /// Length of the formatted area (including header)
    pub length: u8,
    /// Unique handle for this record
    pub handle: SmbiosHandle,
}

impl SmbiosTableHeader {
    /// Creates a new SMBIOS table header
    pub const fn new(record_type: SmbiosType, length: u8, handle: SmbiosHandle) -> Self {
        Self { record_type, length, handle }
    }
}

/// Base Address Modifier / Interrupt Info byte of the Type 38 record.
///
/// | Bit | Meaning |
/// |-----|---------|
/// | 0 | Interrupt trigger mode (1 = level, 0 = edge) |
/// | 1 | Interrupt polarity (1 = active high, 0 = active low) |
/// | 2 | Reserved |
/// | 3 | Interrupt info (1 = specified, 0 = not specified) |
/// | 4 | LS-bit of the register base address, which bit 0 of the base address field cannot carry |
/// | 5-7 | Reserved |
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct BaseAddressModifier {
    /// Interrupt trigger mode.
    pub interrupt_trigger_mode: bool,
    /// Interrupt polarity.
    pub interrupt_polarity: bool,
    #[bits(1)]
    pub reserved_2: u8,
    /// Interrupt information is specified.
    pub interrupt_info_valid: bool,
    /// Least significant bit of the register base address.
    pub register_address_lsb: bool,
    #[bits(3)]
    pub reserved_5: u8,
}

impl BaseAddressModifier {
    /// Packs the modifier byte from the platform configuration.
    pub const fn from_config(config: &IpmiSmbiosConfig) -> Self {
        Self::new()
            .with_interrupt_trigger_mode(config.interrupt_trigger_mode & 1 == 1)
            .with_interrupt_polarity(config.interrupt_polarity & 1 == 1)
            .with_interrupt_info_valid(config.interrupt_info_valid)
            .with_register_address_lsb(config.base_address & 1 == 1)
    }
}

/// IPMI Device Information (Type 38)
///
/// The structure is packed and little endian, exactly as it appears in the SMBIOS table.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, DeriveIntoBytes, Immutable, KnownLayout)]
pub struct SmbiosTableType38 {
    /// Record header
    pub header: SmbiosTableHeader,
    /// BMC interface type, see [`crate::config::InterfaceType`]
    pub interface_type: u8,
    /// IPMI specification version, copied as the BMC reports it in Get Device ID
    pub ipmi_specification_revision: u8,
    /// Slave address of the BMC on the I2C bus
    pub i2c_slave_address: u8,
    /// Bus address of the NV storage device, 0xFF if not present
    pub nv_storage_device_address: u8,
    /// Base address of the interface, bit 0 selects I/O (1) or memory (0) space
    pub base_address: u64,
    /// See [`BaseAddressModifier`]
    pub base_address_modifier_interrupt_info: u8,
    /// Interrupt number, 0 if unused
    pub interrupt_number: u8,
}

impl SmbiosTableType38 {
    /// Creates a zeroed record with only the header type and length set.
    pub const fn new() -> Self {
        Self {
            header: SmbiosTableHeader::new(
                SMBIOS_TYPE_IPMI_DEVICE_INFORMATION,
                SMBIOS_TYPE38_LENGTH as u8,
                SMBIOS_HANDLE_PI_RESERVED,
            ),
            interface_type: 0,
            ipmi_specification_revision: 0,
            i2c_slave_address: 0,
            nv_storage_device_address: 0,
            base_address: 0,
            base_address_modifier_interrupt_info: 0,
            interrupt_number: 0,
        }
    }

    /// Sets every field that comes from platform configuration.
    ///
    /// The IPMI specification revision is left untouched since only the BMC can report it.
    pub fn apply_config(&mut self, config: &IpmiSmbiosConfig) {
        self.interface_type = config.interface_type.into();
        self.i2c_slave_address = config.i2c_slave_address;
        self.nv_storage_device_address = config.nv_storage_device_address;
        self.base_address = encode_base_address(config);
        self.base_address_modifier_interrupt_info = BaseAddressModifier::from_config(config).into_bits();
        self.interrupt_number = config.interrupt_number;
    }

    /// Returns the decoded modifier byte.
    pub fn base_address_modifier(&self) -> BaseAddressModifier {
        BaseAddressModifier::from_bits(self.base_address_modifier_interrupt_info)
    }

    /// Serializes the record the way registration services consume it: the formatted area followed by the
    /// double-NUL terminator of its (empty) string set.
    pub fn to_bytes(&self) -> [u8; SMBIOS_TYPE38_RECORD_SIZE] {
        let mut bytes = [0u8; SMBIOS_TYPE38_RECORD_SIZE];
        bytes[..SMBIOS_TYPE38_LENGTH].copy_from_slice(self.as_bytes());
        bytes
    }
}

impl Default for SmbiosTableType38 {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces bit 0 of the configured base address with the address space flag.
///
/// The displaced bit is reported through [`BaseAddressModifier::register_address_lsb`].
pub const fn encode_base_address(config: &IpmiSmbiosConfig) -> u64 {
    (config.base_address & !1) | config.address_space.bit() as u64
}
