//! TOML configuration for the command line.
//!
//! Sessions run from compiled-in defaults; a config file overrides only the
//! keys it names. Durations are written in milliseconds (`*_ms`) and the
//! direction and start-position knobs are lower-case strings.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use sift_loop::director::{DirectionMode, StartPosition, StepFactorRange};
use sift_loop::pace::PauseRange;
use sift_loop::session::SessionConfig;

/// Everything a `sift` invocation needs: the session knobs plus the shape
/// of the simulated list it runs against.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub session: SessionSettings,
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// `None` selects until the list is exhausted.
    pub target: Option<u32>,
    pub mode: DirectionMode,
    pub start_at: StartPosition,
    pub max_idle_streaks: u32,
    pub confirm_timeout_ms: u64,
    pub confirm_interval_ms: u64,
    pub content_wait_timeout_ms: u64,
    pub content_wait_interval_ms: u64,
    pub pre_toggle_pause_ms: (u64, u64),
    pub between_items_pause_ms: (u64, u64),
    pub after_scroll_pause_ms: (u64, u64),
    pub start_settle_ms: u64,
    pub step_factor_min: f64,
    pub step_factor_max: f64,
    pub fallback_precision: usize,
    pub record_selections: bool,
}

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Number of generated items.
    pub items: u32,
    /// Vertical gap between consecutive item tops.
    pub item_spacing: f64,
    pub viewport_extent: f64,
    /// Content loaded before any scrolling.
    pub initial_extent: f64,
    /// Full content once every lazy chunk has loaded.
    pub total_extent: f64,
    pub lazy_chunk: f64,
    /// Every nth generated item starts out already selected (0 disables).
    pub preselected_every: u32,
    /// Every nth generated item carries no label (0 disables).
    pub unlabeled_every: u32,
}

impl CliConfig {
    pub fn default_values() -> Self {
        Self {
            session: SessionSettings {
                target: None,
                mode: DirectionMode::Forward,
                start_at: StartPosition::Keep,
                max_idle_streaks: 10,
                confirm_timeout_ms: 5000,
                confirm_interval_ms: 150,
                content_wait_timeout_ms: 10_000,
                content_wait_interval_ms: 300,
                pre_toggle_pause_ms: (180, 450),
                between_items_pause_ms: (120, 300),
                after_scroll_pause_ms: (1700, 3200),
                start_settle_ms: 1500,
                step_factor_min: 1.2,
                step_factor_max: 1.8,
                fallback_precision: 1,
                record_selections: false,
            },
            simulation: SimulationSettings {
                items: 200,
                item_spacing: 120.0,
                viewport_extent: 900.0,
                initial_extent: 3000.0,
                total_extent: 24_000.0,
                lazy_chunk: 3000.0,
                preselected_every: 7,
                unlabeled_every: 0,
            },
        }
    }

    /// The session config the loop crate consumes.
    pub fn session_config(&self) -> SessionConfig {
        let s = &self.session;
        SessionConfig {
            target: s.target,
            mode: s.mode,
            start_position: s.start_at,
            max_idle_streaks: s.max_idle_streaks,
            confirm_timeout: Duration::from_millis(s.confirm_timeout_ms),
            confirm_interval: Duration::from_millis(s.confirm_interval_ms),
            content_wait_timeout: Duration::from_millis(s.content_wait_timeout_ms),
            content_wait_interval: Duration::from_millis(s.content_wait_interval_ms),
            pre_toggle_pause: PauseRange::from_millis(
                s.pre_toggle_pause_ms.0,
                s.pre_toggle_pause_ms.1,
            ),
            between_items_pause: PauseRange::from_millis(
                s.between_items_pause_ms.0,
                s.between_items_pause_ms.1,
            ),
            after_scroll_pause: PauseRange::from_millis(
                s.after_scroll_pause_ms.0,
                s.after_scroll_pause_ms.1,
            ),
            start_settle: Duration::from_millis(s.start_settle_ms),
            step_factors: StepFactorRange {
                min: s.step_factor_min,
                max: s.step_factor_max,
            },
            fallback_precision: s.fallback_precision,
            record_selections: s.record_selections,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    session: PartialSessionSettings,
    #[serde(default)]
    pacing: PartialPacingSettings,
    #[serde(default)]
    simulation: PartialSimulationSettings,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSessionSettings {
    target: Option<u32>,
    mode: Option<String>,
    start_at: Option<String>,
    max_idle_streaks: Option<u32>,
    confirm_timeout_ms: Option<u64>,
    confirm_interval_ms: Option<u64>,
    content_wait_timeout_ms: Option<u64>,
    content_wait_interval_ms: Option<u64>,
    fallback_precision: Option<usize>,
    record_selections: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialPacingSettings {
    pre_toggle_min_ms: Option<u64>,
    pre_toggle_max_ms: Option<u64>,
    between_items_min_ms: Option<u64>,
    between_items_max_ms: Option<u64>,
    after_scroll_min_ms: Option<u64>,
    after_scroll_max_ms: Option<u64>,
    start_settle_ms: Option<u64>,
    step_factor_min: Option<f64>,
    step_factor_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSimulationSettings {
    items: Option<u32>,
    item_spacing: Option<f64>,
    viewport_extent: Option<f64>,
    initial_extent: Option<f64>,
    total_extent: Option<f64>,
    lazy_chunk: Option<f64>,
    preselected_every: Option<u32>,
    unlabeled_every: Option<u32>,
}

/// Load config with override precedence: defaults < (optional) config file.
/// An explicitly named file that cannot be read is a hard error; the
/// default path is allowed to be missing.
pub fn load_config(config_file: Option<&str>) -> Result<(CliConfig, Option<PathBuf>), String> {
    let mut cfg = CliConfig::default_values();

    let explicit = config_file
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, required) = if let Some(path) = explicit {
        (Some(path), true)
    } else {
        (default_config_path(), false)
    };

    if let Some(path) = path_to_try {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let parsed: PartialConfig =
                    toml::from_str(&text).map_err(|err| format!("parse config: {err}"))?;
                apply_partial(&mut cfg, parsed)?;
                return Ok((cfg, Some(path)));
            }
            Err(err) => {
                if required {
                    return Err(format!("failed to load config file: {err}"));
                }
            }
        }
    }

    Ok((cfg, None))
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("sift").join("config.toml"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("sift")
                    .join("config.toml"),
            );
        }
    }
    None
}

fn apply_partial(cfg: &mut CliConfig, partial: PartialConfig) -> Result<(), String> {
    let session = partial.session;
    if let Some(target) = session.target {
        // target = 0 in the file means unbounded, same as leaving it out.
        cfg.session.target = (target > 0).then_some(target);
    }
    if let Some(mode) = session.mode {
        cfg.session.mode = parse_mode(&mode)?;
    }
    if let Some(start_at) = session.start_at {
        cfg.session.start_at = parse_start_at(&start_at)?;
    }
    if let Some(value) = session.max_idle_streaks {
        cfg.session.max_idle_streaks = value;
    }
    if let Some(value) = session.confirm_timeout_ms {
        cfg.session.confirm_timeout_ms = value;
    }
    if let Some(value) = session.confirm_interval_ms {
        cfg.session.confirm_interval_ms = value;
    }
    if let Some(value) = session.content_wait_timeout_ms {
        cfg.session.content_wait_timeout_ms = value;
    }
    if let Some(value) = session.content_wait_interval_ms {
        cfg.session.content_wait_interval_ms = value;
    }
    if let Some(value) = session.fallback_precision {
        cfg.session.fallback_precision = value;
    }
    if let Some(value) = session.record_selections {
        cfg.session.record_selections = value;
    }

    let pacing = partial.pacing;
    apply_pause(
        &mut cfg.session.pre_toggle_pause_ms,
        pacing.pre_toggle_min_ms,
        pacing.pre_toggle_max_ms,
        "pacing.pre_toggle",
    )?;
    apply_pause(
        &mut cfg.session.between_items_pause_ms,
        pacing.between_items_min_ms,
        pacing.between_items_max_ms,
        "pacing.between_items",
    )?;
    apply_pause(
        &mut cfg.session.after_scroll_pause_ms,
        pacing.after_scroll_min_ms,
        pacing.after_scroll_max_ms,
        "pacing.after_scroll",
    )?;
    if let Some(value) = pacing.start_settle_ms {
        cfg.session.start_settle_ms = value;
    }
    if let Some(value) = pacing.step_factor_min {
        cfg.session.step_factor_min = value;
    }
    if let Some(value) = pacing.step_factor_max {
        cfg.session.step_factor_max = value;
    }
    if cfg.session.step_factor_min > cfg.session.step_factor_max {
        return Err(format!(
            "pacing.step_factor_min ({}) exceeds step_factor_max ({})",
            cfg.session.step_factor_min, cfg.session.step_factor_max
        ));
    }

    let sim = partial.simulation;
    if let Some(value) = sim.items {
        cfg.simulation.items = value;
    }
    if let Some(value) = sim.item_spacing {
        cfg.simulation.item_spacing = value;
    }
    if let Some(value) = sim.viewport_extent {
        cfg.simulation.viewport_extent = value;
    }
    if let Some(value) = sim.initial_extent {
        cfg.simulation.initial_extent = value;
    }
    if let Some(value) = sim.total_extent {
        cfg.simulation.total_extent = value;
    }
    if let Some(value) = sim.lazy_chunk {
        cfg.simulation.lazy_chunk = value;
    }
    if let Some(value) = sim.preselected_every {
        cfg.simulation.preselected_every = value;
    }
    if let Some(value) = sim.unlabeled_every {
        cfg.simulation.unlabeled_every = value;
    }
    Ok(())
}

fn apply_pause(
    slot: &mut (u64, u64),
    min: Option<u64>,
    max: Option<u64>,
    key: &str,
) -> Result<(), String> {
    if let Some(min) = min {
        slot.0 = min;
    }
    if let Some(max) = max {
        slot.1 = max;
    }
    if slot.0 > slot.1 {
        return Err(format!("{key}_min_ms ({}) exceeds {key}_max_ms ({})", slot.0, slot.1));
    }
    Ok(())
}

fn parse_mode(input: &str) -> Result<DirectionMode, String> {
    match input.trim() {
        "forward" => Ok(DirectionMode::Forward),
        "backward" => Ok(DirectionMode::Backward),
        "adaptive" => Ok(DirectionMode::Adaptive),
        other => Err(format!(
            "unknown session.mode {other:?} (expected forward, backward, or adaptive)"
        )),
    }
}

fn parse_start_at(input: &str) -> Result<StartPosition, String> {
    match input.trim() {
        "keep" => Ok(StartPosition::Keep),
        "top" => Ok(StartPosition::Top),
        "bottom" => Ok(StartPosition::Bottom),
        other => Err(format!(
            "unknown session.start_at {other:?} (expected keep, top, or bottom)"
        )),
    }
}
