//! certadm API service.
//!
//! Lets certificate holders revoke their own certificates, and admins revoke
//! any certificate, in the authority's record store.
//!
//! # Authentication
//!
//! Callers present a bearer JWT whose `aud` claim names them and whose
//! `admin` claim marks administrators. See [`auth`] and
//! [`config::CertAdmApiConfig`] for the verification key options.
//!
//! # Default credential
//!
//! While the stored admin password is still the installation default, every
//! route except the health check answers `503 DefaultCredentialActive`. See
//! [`guard`].

pub mod auth;
pub mod config;
pub mod context;
pub mod deadline;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod revocation;
pub mod server;
