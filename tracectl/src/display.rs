// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tabular dumps of the tracing configuration.

use crate::control::{TargetCfg, TargetCfgDb};
use crate::targets::TargetKind;
use std::fmt::{Display, Formatter};

const RULE: &str = "────────";

macro_rules! ROW {
    () => {
        "{:>48} │ {:>6} │ {:>5} │ {}"
    };
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            TargetKind::Module => "module",
            TargetKind::Custom => "custom",
        })
    }
}

impl Display for TargetCfg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            ROW!(),
            self.target,
            self.kind,
            self.level.to_string(),
            self.tags.join(",")
        )
    }
}

impl Display for TargetCfgDb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{RULE} tracing targets ({}) {RULE}", self.targets.len())?;
        writeln!(f, ROW!(), "TARGET", "KIND", "LEVEL", "TAGS")?;
        self.targets
            .values()
            .try_for_each(|target| writeln!(f, "{target}"))?;
        write!(f, ROW!(), "(default)", "", self.level.to_string(), "")
    }
}

/// The configuration grouped by tag; a target shows under each of its tags.
pub(crate) struct TargetCfgDbByTag<'a>(pub(crate) &'a TargetCfgDb);

impl Display for TargetCfgDbByTag<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let db = self.0;
        writeln!(f)?;
        writeln!(f, "{RULE} tracing targets by tag ({}) {RULE}", db.tags.len())?;
        for tag in db.tags.keys() {
            writeln!(f, "[{tag}]")?;
            for target in db.tag_targets(tag) {
                writeln!(f, "    {:<48} {}", target.target(), target.level())?;
            }
        }
        Ok(())
    }
}
