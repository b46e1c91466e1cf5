// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use ordermap::OrderMap;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tracing::{error, info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::display::TargetCfgDbByTag;
use crate::targets::{TRACING_TARGETS, TargetKind};
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

/// Errors in a textual tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceConfigError {
    /// An item is not of the form `tag=level`.
    #[error("invalid syntax '{0}': it should be tag=level")]
    Syntax(String),
    /// The level is not one of off, error, warn, info, debug, trace.
    #[error("invalid level '{0}'")]
    Level(String),
}

/// The runtime configuration of one target.
#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
    pub(crate) kind: TargetKind,
}

impl TargetCfg {
    fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
        kind: TargetKind,
    ) -> Self {
        // a target is always reachable through its own name
        let mut tags = tags.to_vec();
        if !tags.contains(&name) {
            tags.push(name);
        }
        Self {
            target,
            name,
            level,
            tags,
            kind,
        }
    }

    /// The target string events are emitted with.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// The current level of the target.
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Whether the target was declared with [`crate::custom_target!`].
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.kind == TargetKind::Custom
    }
}

#[derive(Debug)]
pub(crate) struct TargetCfgDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
    pub(crate) tags: OrderMap<&'static str, HashSet<&'static str>>,
}

impl TargetCfgDb {
    fn new(level: LevelFilter) -> Self {
        let mut db = Self {
            level,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for t in TRACING_TARGETS {
            db.register(TargetCfg::new(t.target, t.name, t.level, t.tags, t.kind));
        }
        db
    }

    fn register(&mut self, cfg: TargetCfg) {
        let target = cfg.target;
        for tag in &cfg.tags {
            self.tags.entry(*tag).or_default().insert(target);
        }
        if let Some(exist) = self.targets.insert(target, cfg) {
            warn!("Target {} has been multiply defined!", exist.target);
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.targets
            .values()
            .filter_map(|t| format!("{}={}", t.target, t.level).parse::<Directive>().ok())
            .fold(EnvFilter::new(self.level.to_string()), EnvFilter::add_directive)
    }

    /// Set the level of every target carrying `tag`; returns how many targets changed.
    fn set_tag_level(&mut self, tag: &str, level: LevelFilter) -> usize {
        let Some(members) = self.tags.get(tag) else {
            return 0;
        };
        let mut changed = 0;
        for target in self.targets.values_mut() {
            if members.contains(target.target) && target.level != level {
                target.level = level;
                changed += 1;
            }
        }
        changed
    }

    pub(crate) fn tag_targets(&self, tag: &str) -> Vec<TargetCfg> {
        self.tags.get(tag).map_or_else(Vec::new, |members| {
            self.targets
                .values()
                .filter(|t| members.contains(t.target))
                .cloned()
                .collect()
        })
    }

    /// A config string that reproduces the current levels.
    pub(crate) fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.level);
        for target in self.targets.values() {
            out += &format!(",{}={}", target.name, target.level);
        }
        out
    }
}

/// Handle over the process-wide tracing subscriber and the per-target levels.
#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetCfgDb>,
    reload_filter: reload::Handle<EnvFilter, Registry>,
}

static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();

/// Get the process-wide [`TracingControl`], installing the subscriber on first use.
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

impl TracingControl {
    fn new() -> Self {
        let db = TargetCfgDb::new(LevelFilter::INFO);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_target(true)
            .with_thread_names(true)
            .with_level(true);

        // a subscriber may already be installed (e.g. by a test harness); keep going without ours
        if let Err(e) = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
        {
            eprintln!("tracing subscriber not installed: {e}");
        }

        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }

    fn db(&self) -> MutexGuard<'_, TargetCfgDb> {
        self.db.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn reload(&self, db: &TargetCfgDb) {
        if let Err(e) = self.reload_filter.reload(db.env_filter()) {
            error!("Failed to reload tracing filter: {e}");
        }
    }

    #[cfg(test)]
    fn register(
        &self,
        target: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) {
        let mut db = self.db();
        db.register(TargetCfg::new(target, target, level, tags, TargetKind::Custom));
        self.reload(&db);
    }

    /// Install the subscriber if that has not happened yet.
    pub fn init() {
        get_trace_ctl();
    }

    /// Set the level of every target tagged with `tag`.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) {
        let mut db = self.db();
        let changed = db.set_tag_level(tag, level);
        if changed > 0 {
            self.reload(&db);
        }
        info!("Changed log level for tag '{tag}' to {level}. Targets changed: {changed}");
    }

    /// Set the level of every known target.
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.db();
        db.targets.values_mut().for_each(|t| t.level = level);
        self.reload(&db);
    }

    /// Set the level applied to events of targets nobody declared.
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.db();
        if db.level != level {
            db.level = level;
            info!("Set default log level to {level}");
            self.reload(&db);
        }
    }

    #[must_use]
    pub fn get_default_level(&self) -> LevelFilter {
        self.db().level
    }

    /// Parse comma-separated `tag=level` items.
    fn parse_tracing_config(input: &str) -> Result<OrderMap<String, LevelFilter>, TraceConfigError> {
        input
            .split(',')
            .map(str::trim)
            .map(|item| {
                let (tag, level) = item
                    .split_once('=')
                    .ok_or_else(|| TraceConfigError::Syntax(item.to_string()))?;
                let level = LevelFilter::from_str(level.trim())
                    .map_err(|_| TraceConfigError::Level(level.trim().to_string()))?;
                Ok((tag.trim().to_string(), level))
            })
            .collect()
    }

    /// Apply a textual configuration such as `default=error,all=info,openflow=trace`.
    ///
    /// `default` sets the fallback level, `all` sets every target, anything else is a tag.
    /// Later items override earlier ones.
    ///
    /// # Errors
    ///
    /// Fails without applying anything if any item is malformed.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceConfigError> {
        let config = Self::parse_tracing_config(input)?;
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        config
            .iter()
            .filter(|(tag, _)| !matches!(tag.as_str(), "default" | "all"))
            .for_each(|(tag, level)| self.set_tag_level(tag, *level));
        Ok(())
    }

    #[must_use]
    pub fn get_target(&self, target: &str) -> Option<TargetCfg> {
        self.db().targets.get(target).cloned()
    }

    #[must_use]
    pub fn get_targets_by_tag(&self, tag: &str) -> Vec<TargetCfg> {
        self.db().tag_targets(tag)
    }

    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.db().as_config_string()
    }

    /// Log the configuration, grouped by tag.
    pub fn dump_targets_by_tag(&self) {
        let db = self.db();
        info!("{}", TargetCfgDbByTag(&db));
    }

    /// Log the configuration, one line per target.
    pub fn dump(&self) {
        let db = self.db();
        info!("{}", *db);
    }
}

#[cfg(test)]
mod tests {
    use crate::control::{TraceConfigError, TracingControl, get_trace_ctl};
    use crate::targets::TRACING_TARGETS;
    use crate::{LevelFilter, custom_target, tdebug, terror, tinfo, ttrace, twarn};
    use serial_test::serial;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::util::SubscriberInitExt;

    #[test]
    #[serial]
    fn init_is_idempotent() {
        TracingControl::init();
        TracingControl::init();
        let tctl = get_trace_ctl();
        tinfo!("tracectl-test", "default level is {}", tctl.get_default_level());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn level_macros_emit_on_named_target() {
        custom_target!("named-target", LevelFilter::TRACE, &["named"]);
        assert_eq!(
            get_trace_ctl().get_target("named-target").unwrap().level(),
            LevelFilter::TRACE
        );

        let sink = Captured::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(LevelFilter::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        {
            let _guard = subscriber.set_default();
            terror!("named-target", "e{}", 1);
            twarn!("named-target", "w{}", 2);
            tinfo!("named-target", "i{}", 3);
            tdebug!("named-target", "d{}", 4);
            ttrace!("named-target", "t{}", 5);
        }
        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 5, "{out}");
        for (line, (level, msg)) in lines.iter().zip([
            ("ERROR", "e1"),
            ("WARN", "w2"),
            ("INFO", "i3"),
            ("DEBUG", "d4"),
            ("TRACE", "t5"),
        ]) {
            assert!(line.contains(level), "{line}");
            assert!(line.contains("named-target"), "{line}");
            assert!(line.ends_with(msg), "{line}");
        }
    }

    #[test]
    #[serial]
    fn link_time_targets_are_loaded() {
        custom_target!("linked-1", LevelFilter::ERROR, &["linked"]);
        custom_target!("linked-2", LevelFilter::WARN, &["linked"]);

        let static_targets: Vec<&str> = TRACING_TARGETS.iter().map(|t| t.target).collect();
        assert!(static_targets.contains(&"linked-1"));
        assert!(static_targets.contains(&"linked-2"));
        // declared by this module through trace_target!
        assert!(static_targets.contains(&"ofagent_tracectl::control"));

        let tctl = get_trace_ctl();
        assert_eq!(tctl.get_target("linked-1").unwrap().level(), LevelFilter::ERROR);
        assert!(tctl.get_target("linked-2").unwrap().is_custom());
        assert_eq!(tctl.get_targets_by_tag("linked").len(), 2);
    }

    #[test]
    #[serial]
    fn tag_level_applies_to_members_only() {
        const TAG: &str = "common-tag";
        let tctl = get_trace_ctl();
        tctl.register("t1", LevelFilter::DEBUG, &[TAG]);
        tctl.register("t2", LevelFilter::ERROR, &[TAG]);
        tctl.register("t3", LevelFilter::WARN, &[]);

        tctl.set_tag_level(TAG, LevelFilter::OFF);

        assert_eq!(tctl.get_target("t1").unwrap().level(), LevelFilter::OFF);
        assert_eq!(tctl.get_target("t2").unwrap().level(), LevelFilter::OFF);
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::WARN);
        tctl.dump_targets_by_tag();
    }

    #[test]
    #[serial]
    fn setup_from_string() {
        let tctl = get_trace_ctl();
        tctl.register("s1", LevelFilter::INFO, &["group-a"]);
        tctl.register("s2", LevelFilter::INFO, &["group-b"]);

        tctl.setup_from_string("default=error, all=info, group-a=off, s2=trace")
            .unwrap();

        assert_eq!(tctl.get_default_level(), LevelFilter::ERROR);
        assert_eq!(tctl.get_target("s1").unwrap().level(), LevelFilter::OFF);
        assert_eq!(tctl.get_target("s2").unwrap().level(), LevelFilter::TRACE);
        assert!(tctl.as_config_string().starts_with("default=error"));
        assert!(tctl.as_config_string().contains("s2=trace"));
        tctl.dump();

        tctl.set_default_level(LevelFilter::INFO);
    }

    #[test]
    #[serial]
    fn bad_config_is_rejected() {
        let tctl = get_trace_ctl();
        assert_eq!(
            tctl.setup_from_string("group-a=bad"),
            Err(TraceConfigError::Level("bad".to_string()))
        );
        assert_eq!(
            tctl.setup_from_string("group-a=error, foo"),
            Err(TraceConfigError::Syntax("foo".to_string()))
        );
    }
}
