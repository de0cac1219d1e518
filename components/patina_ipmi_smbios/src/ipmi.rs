//! IPMI command support
//!
//! The subset of IPMI needed to describe the BMC: an abstract command transport and the Get Device ID command built
//! on top of it.
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
use zerocopy::FromBytes;
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Application network function (IPMI 2.0, table 5-1).
pub const IPMI_NETFN_APP: u8 = 0x06;

/// Get Device ID command (IPMI 2.0, section 20.1).
pub const IPMI_APP_GET_DEVICE_ID: u8 = 0x01;

/// Completion code for a successfully executed command.
pub const IPMI_COMP_CODE_NORMAL: u8 = 0x00;

/// Size of a Get Device ID response without the optional auxiliary firmware revision.
pub const IPMI_GET_DEVICE_ID_MIN_RESPONSE_SIZE: usize = 12;

/// A command/response channel to the BMC.
///
/// Implementations deliver a request to the BMC and copy the response, starting with the completion code, into
/// `response`. Timeouts and transport failures are reported as the `Err` status.
#[cfg_attr(test, automock)]
pub trait IpmiTransport {
    /// Submits a command and returns the number of response bytes written.
    fn submit_command(
        &self,
        net_function: u8,
        command: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, efi::Status>;
}

/// Get Device ID response (IPMI 2.0, table 20-2).
#[repr(C, packed)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpmiGetDeviceIdResponse {
    /// Completion code
    pub completion_code: u8,
    /// Device ID
    pub device_id: u8,
    /// Bit 7: device provides SDRs, bits 3:0: device revision
    pub device_revision: u8,
    /// Bit 7: device available, bits 6:0: major firmware revision
    pub firmware_rev1: u8,
    /// Minor firmware revision in BCD
    pub minor_firmware_rev: u8,
    /// IPMI version in BCD, bits 3:0 major and bits 7:4 minor
    pub specification_version: u8,
    /// Additional device support bitmap
    pub device_support: u8,
    /// IANA manufacturer ID, little endian
    pub manufacturer_id: [u8; 3],
    /// Product ID, little endian
    pub product_id: [u8; 2],
    /// Auxiliary firmware revision, optional in the response
    pub aux_firmware_rev_info: [u8; 4],
}

impl IpmiGetDeviceIdResponse {
    /// Decodes the bytes the BMC returned for Get Device ID.
    ///
    /// A non-normal completion code or a response shorter than the mandatory fields is a device error. The
    /// auxiliary firmware revision reads as zero when the BMC omits it.
    pub fn parse(response: &[u8]) -> Result<Self, efi::Status> {
        let Some(&completion_code) = response.first() else {
            log::error!("IPMI Get Device ID returned an empty response.");
            return Err(efi::Status::DEVICE_ERROR);
        };

        if completion_code != IPMI_COMP_CODE_NORMAL {
            log::error!("IPMI Get Device ID failed with completion code {:#04x}.", completion_code);
            return Err(efi::Status::DEVICE_ERROR);
        }

        if response.len() < IPMI_GET_DEVICE_ID_MIN_RESPONSE_SIZE {
            log::error!("IPMI Get Device ID response too short: {} bytes.", response.len());
            return Err(efi::Status::DEVICE_ERROR);
        }

        let mut buffer = [0u8; core::mem::size_of::<Self>()];
        let len = response.len().min(buffer.len());
        buffer[..len].copy_from_slice(&response[..len]);

        Self::read_from_bytes(&buffer).map_err(|_| efi::Status::DEVICE_ERROR)
    }

    /// IPMI major version, e.g. 2 for IPMI 2.0.
    pub fn ipmi_major_version(&self) -> u8 {
        self.specification_version & 0x0F
    }

    /// IPMI minor version, e.g. 0 for IPMI 2.0.
    pub fn ipmi_minor_version(&self) -> u8 {
        (self.specification_version & 0xF0) >> 4
    }

    /// 20-bit IANA manufacturer ID.
    pub fn manufacturer_id(&self) -> u32 {
        u32::from_le_bytes([self.manufacturer_id[0], self.manufacturer_id[1], self.manufacturer_id[2], 0]) & 0x000F_FFFF
    }

    /// Product ID.
    pub fn product_id(&self) -> u16 {
        u16::from_le_bytes(self.product_id)
    }
}

/// Typed IPMI commands.
#[cfg_attr(test, automock)]
pub trait IpmiCommands {
    /// Sends Get Device ID to the BMC.
    fn get_device_id(&self) -> Result<IpmiGetDeviceIdResponse, efi::Status>;
}

impl<T> IpmiCommands for T
where
    T: IpmiTransport,
{
    fn get_device_id(&self) -> Result<IpmiGetDeviceIdResponse, efi::Status> {
        let mut response = [0u8; core::mem::size_of::<IpmiGetDeviceIdResponse>()];
        let len = self.submit_command(IPMI_NETFN_APP, IPMI_APP_GET_DEVICE_ID, &[], &mut response).inspect_err(
            |status| log::error!("IPMI Get Device ID could not be submitted. Status = {:#x?}", status),
        )?;

        let response = &response[..len.min(response.len())];
        log::trace!("IPMI Get Device ID response: {:02x?}", response);
        IpmiGetDeviceIdResponse::parse(response)
    }
}
