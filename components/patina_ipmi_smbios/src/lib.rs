//! IPMI SMBIOS Support
//!
//! Publishes the SMBIOS Type 38 (IPMI Device Information) record so the OS can find the BMC's in-band IPMI
//! interface.
//!
//! The record mixes two sources:
//!
//! - the IPMI specification version, reported by the BMC through Get Device ID, and
//! - the interface type, addresses and interrupt wiring, which only the platform knows ([`config::IpmiSmbiosConfig`]).
//!
//! ```text
//!  locate SMBIOS protocol ──► Get Device ID ──► assemble Type 38 ──► SMBIOS Add ──► handle
//!           │                       │                                     │
//!           └─────────── any failure returns the collaborator's status ───┘
//! ```
//!
//! Nothing is submitted unless every preceding step succeeded.
//!
//! ## Usage
//!
//! ```rust,ignore
//! Core::default()
//!     // ...
//!     .with_config(patina_ipmi_smbios::config::IpmiSmbiosConfig::default())
//!     .with_component(patina_ipmi_smbios::IpmiSmbiosType38::new())
//!     .start()
//!     .unwrap();
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(not(test), no_std)]

// The SDK derive macros emit paths rooted at `patina`, the SDK's published crate name.
extern crate patina_sdk as patina;

pub mod builder;
pub mod component;
pub mod config;
pub mod error;
pub mod ipmi;
pub mod protocol;
pub mod service;
pub mod smbios_record;

pub use component::IpmiSmbiosType38;
