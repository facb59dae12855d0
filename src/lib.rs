#![doc = "crumb-convert-core: conversion pipeline from Körbchen exports to Crouton bundles."]

//! This crate holds all conversion logic: envelope decoding, recipe
//! normalization, unit reconciliation, image resolution and bundle building.
//! The CLI crate only adds argument parsing, config loading and the HTTP
//! image fetcher.
//!
//! # Usage
//! Call [`convert::convert`] with a [`config::ConvertConfig`], an
//! [`contract::ImageFetcher`] and an [`contract::IdGenerator`].

pub mod bundle;
pub mod config;
pub mod contract;
pub mod convert;
pub mod error;
pub mod images;
pub mod normalize;
pub mod recipe;
pub mod slug;
pub mod tagged;
pub mod units;
