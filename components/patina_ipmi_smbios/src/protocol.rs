//! UEFI protocol bindings
//!
//! C layouts of the EFI SMBIOS protocol and the EDKII IPMI protocol, plus the [`SmbiosLocator`],
//! [`SmbiosRegistration`] and [`IpmiTransport`] implementations that drive them through boot services.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{ffi::c_char, ptr};

use patina_sdk::{
    boot_services::{BootServices, StandardBootServices},
    uefi_protocol::ProtocolInterface,
};
use r_efi::efi;

use crate::{
    ipmi::IpmiTransport,
    service::{SmbiosLocator, SmbiosRegistration},
    smbios_record::{SmbiosHandle, SmbiosTableHeader, SmbiosType},
};

type SmbiosAdd = extern "efiapi" fn(
    *const EfiSmbiosProtocol,
    efi::Handle,
    *mut SmbiosHandle,
    *const SmbiosTableHeader,
) -> efi::Status;

type SmbiosUpdateString =
    extern "efiapi" fn(*const EfiSmbiosProtocol, *mut SmbiosHandle, *mut usize, *const c_char) -> efi::Status;

type SmbiosRemove = extern "efiapi" fn(*const EfiSmbiosProtocol, SmbiosHandle) -> efi::Status;

type SmbiosGetNext = extern "efiapi" fn(
    *const EfiSmbiosProtocol,
    *mut SmbiosHandle,
    *mut SmbiosType,
    *mut *mut SmbiosTableHeader,
    *mut efi::Handle,
) -> efi::Status;

/// EFI_SMBIOS_PROTOCOL
#[repr(C)]
pub struct EfiSmbiosProtocol {
    pub add: SmbiosAdd,
    pub update_string: SmbiosUpdateString,
    pub remove: SmbiosRemove,
    pub get_next: SmbiosGetNext,
    pub major_version: u8,
    pub minor_version: u8,
}

unsafe impl ProtocolInterface for EfiSmbiosProtocol {
    const PROTOCOL_GUID: efi::Guid =
        efi::Guid::from_fields(0x03583ff6, 0xcb36, 0x4940, 0x94, 0x7e, &[0xb9, 0xb3, 0x9f, 0x4a, 0xfa, 0xf7]);
}

type IpmiSubmitCommand =
    extern "efiapi" fn(*const IpmiProtocol, u8, u8, *const u8, u32, *mut u8, *mut u32) -> efi::Status;

/// EDKII IPMI_PROTOCOL
#[repr(C)]
pub struct IpmiProtocol {
    pub ipmi_submit_command: IpmiSubmitCommand,
}

unsafe impl ProtocolInterface for IpmiProtocol {
    const PROTOCOL_GUID: efi::Guid =
        efi::Guid::from_fields(0xdbc6381f, 0x5554, 0x4d14, 0x8f, 0xfd, &[0x76, 0xd7, 0x87, 0xb8, 0xac, 0xbf]);
}

impl SmbiosRegistration for &'static EfiSmbiosProtocol {
    fn add(
        &self,
        producer_handle: Option<efi::Handle>,
        smbios_handle: &mut SmbiosHandle,
        record: &[u8],
    ) -> Result<(), efi::Status> {
        if record.len() < core::mem::size_of::<SmbiosTableHeader>() {
            return Err(efi::Status::INVALID_PARAMETER);
        }

        let status = (self.add)(
            *self as *const EfiSmbiosProtocol,
            producer_handle.unwrap_or(ptr::null_mut()),
            smbios_handle as *mut SmbiosHandle,
            record.as_ptr() as *const SmbiosTableHeader,
        );

        if status.is_error() {
            return Err(status);
        }
        Ok(())
    }
}

/// Locates the SMBIOS protocol through boot services.
#[derive(Clone)]
pub struct BootServicesSmbiosLocator<B: BootServices = StandardBootServices> {
    boot_services: B,
}

impl<B: BootServices> BootServicesSmbiosLocator<B> {
    pub fn new(boot_services: B) -> Self {
        Self { boot_services }
    }
}

impl<B: BootServices> SmbiosLocator for BootServicesSmbiosLocator<B> {
    type Registration = &'static EfiSmbiosProtocol;

    fn locate(&self) -> Result<Self::Registration, efi::Status> {
        // SAFETY: `EfiSmbiosProtocol` has the layout of the interface installed under its GUID.
        let protocol: &'static EfiSmbiosProtocol =
            unsafe { self.boot_services.locate_protocol::<EfiSmbiosProtocol>(None) }.map_err(efi::Status::from)?;
        Ok(protocol)
    }
}

impl IpmiTransport for &'static IpmiProtocol {
    fn submit_command(
        &self,
        net_function: u8,
        command: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, efi::Status> {
        let request_size = u32::try_from(request.len()).map_err(|_| efi::Status::INVALID_PARAMETER)?;
        let mut response_size = u32::try_from(response.len()).map_err(|_| efi::Status::INVALID_PARAMETER)?;

        log::trace!("IPMI request: netfn {:#04x} cmd {:#04x} data {:02x?}", net_function, command, request);

        let status = (self.ipmi_submit_command)(
            *self as *const IpmiProtocol,
            net_function,
            command,
            request.as_ptr(),
            request_size,
            response.as_mut_ptr(),
            &mut response_size,
        );

        if status.is_error() {
            return Err(status);
        }
        Ok((response_size as usize).min(response.len()))
    }
}

/// Sends IPMI commands through the IPMI protocol, located on each use.
#[derive(Clone)]
pub struct BootServicesIpmiTransport<B: BootServices = StandardBootServices> {
    boot_services: B,
}

impl<B: BootServices> BootServicesIpmiTransport<B> {
    pub fn new(boot_services: B) -> Self {
        Self { boot_services }
    }
}

impl<B: BootServices> IpmiTransport for BootServicesIpmiTransport<B> {
    fn submit_command(
        &self,
        net_function: u8,
        command: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, efi::Status> {
        // SAFETY: `IpmiProtocol` has the layout of the interface installed under its GUID.
        let protocol: &'static IpmiProtocol = unsafe { self.boot_services.locate_protocol::<IpmiProtocol>(None) }
            .map_err(efi::Status::from)
            .inspect_err(|status| log::error!("Failed to locate the IPMI protocol. Status = {:#x?}", status))?;
        protocol.submit_command(net_function, command, request, response)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::sync::Mutex;
    use std::vec::Vec;

    use patina_sdk::boot_services::MockBootServices;

    use super::*;
    use crate::{
        ipmi::{IPMI_APP_GET_DEVICE_ID, IPMI_NETFN_APP, IpmiCommands},
        smbios_record::{SMBIOS_HANDLE_PI_RESERVED, SMBIOS_TYPE_IPMI_DEVICE_INFORMATION, SmbiosTableType38},
    };

    static ADDED: Mutex<Vec<(SmbiosHandle, Vec<u8>)>> = Mutex::new(Vec::new());

    extern "efiapi" fn mock_add(
        _protocol: *const EfiSmbiosProtocol,
        _producer_handle: efi::Handle,
        smbios_handle: *mut SmbiosHandle,
        record: *const SmbiosTableHeader,
    ) -> efi::Status {
        // SAFETY: the test passes a valid handle and a record of `header.length` bytes plus two terminators.
        unsafe {
            let length = (*record).length as usize + 2;
            let bytes = core::slice::from_raw_parts(record as *const u8, length);
            ADDED.lock().unwrap().push((*smbios_handle, bytes.to_vec()));
            *smbios_handle = 0x0042;
        }
        efi::Status::SUCCESS
    }

    extern "efiapi" fn mock_add_fail(
        _protocol: *const EfiSmbiosProtocol,
        _producer_handle: efi::Handle,
        _smbios_handle: *mut SmbiosHandle,
        _record: *const SmbiosTableHeader,
    ) -> efi::Status {
        efi::Status::INVALID_PARAMETER
    }

    extern "efiapi" fn mock_update_string(
        _protocol: *const EfiSmbiosProtocol,
        _smbios_handle: *mut SmbiosHandle,
        _string_number: *mut usize,
        _string: *const c_char,
    ) -> efi::Status {
        efi::Status::UNSUPPORTED
    }

    extern "efiapi" fn mock_remove(_protocol: *const EfiSmbiosProtocol, _smbios_handle: SmbiosHandle) -> efi::Status {
        efi::Status::UNSUPPORTED
    }

    extern "efiapi" fn mock_get_next(
        _protocol: *const EfiSmbiosProtocol,
        _smbios_handle: *mut SmbiosHandle,
        _record_type: *mut SmbiosType,
        _record: *mut *mut SmbiosTableHeader,
        _producer_handle: *mut efi::Handle,
    ) -> efi::Status {
        efi::Status::NOT_FOUND
    }

    fn smbios_protocol(add: SmbiosAdd) -> EfiSmbiosProtocol {
        EfiSmbiosProtocol {
            add,
            update_string: mock_update_string,
            remove: mock_remove,
            get_next: mock_get_next,
            major_version: 3,
            minor_version: 0,
        }
    }

    fn leak_smbios_protocol(add: SmbiosAdd) -> &'static EfiSmbiosProtocol {
        std::boxed::Box::leak(std::boxed::Box::new(smbios_protocol(add)))
    }

    extern "efiapi" fn mock_submit_command(
        _protocol: *const IpmiProtocol,
        net_function: u8,
        command: u8,
        _request: *const u8,
        request_size: u32,
        response: *mut u8,
        response_size: *mut u32,
    ) -> efi::Status {
        if net_function != IPMI_NETFN_APP || command != IPMI_APP_GET_DEVICE_ID || request_size != 0 {
            return efi::Status::UNSUPPORTED;
        }

        let device_id = [0x00, 0x20, 0x01, 0x02, 0x03, 0x02, 0xBF, 0x57, 0x01, 0x00, 0x34, 0x12];
        // SAFETY: the caller provides a response buffer of at least `*response_size` bytes.
        unsafe {
            if (*response_size as usize) < device_id.len() {
                return efi::Status::BUFFER_TOO_SMALL;
            }
            ptr::copy_nonoverlapping(device_id.as_ptr(), response, device_id.len());
            *response_size = device_id.len() as u32;
        }
        efi::Status::SUCCESS
    }

    extern "efiapi" fn mock_submit_command_timeout(
        _protocol: *const IpmiProtocol,
        _net_function: u8,
        _command: u8,
        _request: *const u8,
        _request_size: u32,
        _response: *mut u8,
        _response_size: *mut u32,
    ) -> efi::Status {
        efi::Status::TIMEOUT
    }

    #[test]
    fn test_protocol_guids() {
        assert_eq!(
            EfiSmbiosProtocol::PROTOCOL_GUID,
            efi::Guid::from_fields(0x03583ff6, 0xcb36, 0x4940, 0x94, 0x7e, &[0xb9, 0xb3, 0x9f, 0x4a, 0xfa, 0xf7])
        );
        assert_ne!(EfiSmbiosProtocol::PROTOCOL_GUID, IpmiProtocol::PROTOCOL_GUID);
    }

    #[test]
    fn test_smbios_protocol_add_passes_record_through() {
        let protocol = leak_smbios_protocol(mock_add);
        let record = SmbiosTableType38::new().to_bytes();

        let mut handle = SMBIOS_HANDLE_PI_RESERVED;
        assert_eq!(protocol.add(None, &mut handle, &record), Ok(()));
        assert_eq!(handle, 0x0042);

        let added = ADDED.lock().unwrap();
        let (requested_handle, bytes) = added.last().unwrap();
        assert_eq!(*requested_handle, SMBIOS_HANDLE_PI_RESERVED);
        assert_eq!(bytes[0], SMBIOS_TYPE_IPMI_DEVICE_INFORMATION);
        assert_eq!(bytes.as_slice(), &record[..]);
    }

    #[test]
    fn test_smbios_protocol_add_failure() {
        let protocol = leak_smbios_protocol(mock_add_fail);
        let record = SmbiosTableType38::new().to_bytes();

        let mut handle = SMBIOS_HANDLE_PI_RESERVED;
        assert_eq!(protocol.add(None, &mut handle, &record), Err(efi::Status::INVALID_PARAMETER));
        assert_eq!(handle, SMBIOS_HANDLE_PI_RESERVED);
    }

    #[test]
    fn test_smbios_protocol_add_rejects_truncated_record() {
        let protocol = leak_smbios_protocol(mock_add);
        let mut handle = SMBIOS_HANDLE_PI_RESERVED;
        assert_eq!(protocol.add(None, &mut handle, &[38, 0x12]), Err(efi::Status::INVALID_PARAMETER));
    }

    #[test]
    fn test_ipmi_protocol_get_device_id() {
        let protocol: &'static IpmiProtocol =
            std::boxed::Box::leak(std::boxed::Box::new(IpmiProtocol { ipmi_submit_command: mock_submit_command }));

        let device_id = protocol.get_device_id().unwrap();
        assert_eq!(device_id.device_id, 0x20);
        assert_eq!(device_id.specification_version, 0x02);
        assert_eq!(device_id.manufacturer_id(), 0x157);
        assert_eq!(device_id.product_id(), 0x1234);
    }

    #[test]
    fn test_ipmi_protocol_timeout_is_verbatim() {
        let protocol: &'static IpmiProtocol = std::boxed::Box::leak(std::boxed::Box::new(IpmiProtocol {
            ipmi_submit_command: mock_submit_command_timeout,
        }));

        assert_eq!(protocol.get_device_id(), Err(efi::Status::TIMEOUT));
    }

    #[test]
    fn test_locator_uses_boot_services() {
        let mut boot_services = MockBootServices::new();
        boot_services
            .expect_locate_protocol::<EfiSmbiosProtocol>()
            .once()
            .return_once(|_| Ok(std::boxed::Box::leak(std::boxed::Box::new(smbios_protocol(mock_add_fail)))));

        let locator = BootServicesSmbiosLocator::new(boot_services);
        let protocol = locator.locate().unwrap();
        assert_eq!(protocol.major_version, 3);

        let mut handle = SMBIOS_HANDLE_PI_RESERVED;
        let record = SmbiosTableType38::new().to_bytes();
        assert_eq!(protocol.add(None, &mut handle, &record), Err(efi::Status::INVALID_PARAMETER));
    }

    #[test]
    fn test_locator_returns_locate_status() {
        let mut boot_services = MockBootServices::new();
        boot_services
            .expect_locate_protocol::<EfiSmbiosProtocol>()
            .once()
            .return_once(|_| Err(efi::Status::NOT_FOUND));

        let locator = BootServicesSmbiosLocator::new(boot_services);
        assert_eq!(locator.locate().err(), Some(efi::Status::NOT_FOUND));
    }

    #[test]
    fn test_ipmi_transport_locates_protocol_per_command() {
        let mut boot_services = MockBootServices::new();
        boot_services.expect_locate_protocol::<IpmiProtocol>().once().return_once(|_| {
            Ok(std::boxed::Box::leak(std::boxed::Box::new(IpmiProtocol { ipmi_submit_command: mock_submit_command })))
        });

        let transport = BootServicesIpmiTransport::new(boot_services);
        let device_id = transport.get_device_id().unwrap();
        assert_eq!(device_id.device_id, 0x20);
        assert_eq!(device_id.ipmi_major_version(), 2);
    }

    #[test]
    fn test_ipmi_transport_without_protocol() {
        let mut boot_services = MockBootServices::new();
        boot_services.expect_locate_protocol::<IpmiProtocol>().once().return_once(|_| Err(efi::Status::NOT_FOUND));

        let transport = BootServicesIpmiTransport::new(boot_services);
        assert_eq!(transport.get_device_id(), Err(efi::Status::NOT_FOUND));
    }
}
