// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of tracing targets.
//!
//! Crates declare their targets with [`trace_target!`] or [`custom_target!`]. Declarations are
//! collected by `linkme` into [`TRACING_TARGETS`] so that the control knows about every target
//! of every linked crate before the first event is emitted. Crates using the macros must depend
//! on `linkme`.

use crate::LevelFilter;
use linkme::distributed_slice;

/// How events reach a declared target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Events carry the declaring module's path (plain `tracing` macros).
    Module,
    /// Events name the target explicitly (`tracing::info!(target: "...", ...)`).
    Custom,
}

/// A statically declared tracing target.
#[derive(Debug)]
pub struct STarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
    pub(crate) kind: TargetKind,
}

impl STarget {
    /// A target matching the events of module `path`, known to users as `name`.
    #[must_use]
    pub const fn module(
        path: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target: path,
            name,
            level,
            tags,
            kind: TargetKind::Module,
        }
    }

    /// A target named explicitly by the events it matches.
    #[must_use]
    pub const fn custom(
        target: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name: target,
            level,
            tags,
            kind: TargetKind::Custom,
        }
    }

    /// The target string events are matched on.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// The default level of the target.
    #[must_use]
    pub const fn level(&self) -> LevelFilter {
        self.level
    }

    /// The tags the target was declared with.
    #[must_use]
    pub const fn tags(&self) -> &'static [&'static str] {
        self.tags
    }
}

#[distributed_slice]
pub static TRACING_TARGETS: [STarget];

#[doc(hidden)]
#[macro_export]
macro_rules! register_target {
    ($ctor:expr) => {
        // own const scope per expansion: imports don't clash and every
        // `TRACE_TGT` static gets a distinct linker name
        const _: () = {
            use linkme::distributed_slice;
            #[allow(unused_imports)]
            use $crate::LevelFilter;
            use $crate::targets::{STarget, TRACING_TARGETS};

            #[distributed_slice(TRACING_TARGETS)]
            static TRACE_TGT: STarget = $ctor;
        };
    };
}

/// Declare the calling module as a tracing target, with a name, default level and tags.
///
/// ```ignore
/// use tracectl::trace_target;
/// trace_target!("ofpact", LevelFilter::INFO, &["openflow"]);
/// ```
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        $crate::register_target!(STarget::module(module_path!(), $name, $level, $tags));
    };
}

/// Declare a tracing target whose name is not a module path.
#[macro_export]
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        $crate::register_target!(STarget::custom($target, $level, $tags));
    };
}

// Events on an explicitly named target (see [`custom_target!`]): the target comes first, the
// rest is handed to the `tracing` macro of the same level.

/// `tracing::error!` on `$target`.
#[macro_export]
macro_rules! terror {
    ($target:expr, $($args:tt)*) => {
        tracing::error!(target: $target, $($args)*)
    };
}

/// `tracing::warn!` on `$target`.
#[macro_export]
macro_rules! twarn {
    ($target:expr, $($args:tt)*) => {
        tracing::warn!(target: $target, $($args)*)
    };
}

/// `tracing::info!` on `$target`.
#[macro_export]
macro_rules! tinfo {
    ($target:expr, $($args:tt)*) => {
        tracing::info!(target: $target, $($args)*)
    };
}

/// `tracing::debug!` on `$target`.
#[macro_export]
macro_rules! tdebug {
    ($target:expr, $($args:tt)*) => {
        tracing::debug!(target: $target, $($args)*)
    };
}

/// `tracing::trace!` on `$target`.
#[macro_export]
macro_rules! ttrace {
    ($target:expr, $($args:tt)*) => {
        tracing::trace!(target: $target, $($args)*)
    };
}
