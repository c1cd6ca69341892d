use blackjack_bot::{
    Bidspread, FlatBet, H17_HARD, H17_SOFT, H17_SPLITS, HighLow, Ruleset, RulesetError,
    TableRules, TrackingStrategy,
};
use blackjack_core::DECK_SIZE;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

use crate::simulator::{
    DEFAULT_BANKROLL, DEFAULT_DECKS, DEFAULT_PENETRATION, DEFAULT_ROUNDS_PER_HOUR, DEFAULT_SEED,
    DEFAULT_SHOES, SimulationError, SimulationSettings, default_workers, round_card_bound,
};

const DEFAULT_RUN_ID: &str = "blackjack";
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulation configuration loaded from YAML. Every block is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_run_id")]
    pub run_id: String,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub simulation: RunConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimulationConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.run_id.trim().is_empty() {
            self.run_id = default_run_id();
        }
        validate_run_id(&self.run_id)?;
        self.table.validate()?;
        self.strategy.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        self.settings()
            .validate(&self.table_rules(), self.strategy().max_spots())
            .map_err(|err| match err {
                SimulationError::Settings { field, message } => ValidationError::InvalidField {
                    field: field.to_string(),
                    message,
                },
                other => ValidationError::InvalidField {
                    field: "simulation".to_string(),
                    message: other.to_string(),
                },
            })?;
        Ok(())
    }

    pub fn table_rules(&self) -> TableRules {
        TableRules {
            dealer_hits_soft17: self.table.dealer_hits_soft17,
            double_after_split: self.table.double_after_split,
            resplit_aces: self.table.resplit_aces,
            max_splits: self.table.max_splits,
        }
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            decks: self.table.decks,
            penetration: self.table.penetration,
            bankroll: self.table.bankroll,
            shoes: self.simulation.shoes,
            workers: self.simulation.workers.unwrap_or_else(default_workers),
            seed: self.simulation.seed,
            rounds_per_hour: self.simulation.rounds_per_hour,
        }
    }

    /// Builds the bundled chart under the configured table rules.
    pub fn ruleset(&self) -> Result<Ruleset, RulesetError> {
        Ruleset::builder()
            .rules(self.table_rules())
            .rows(H17_HARD)
            .rows(H17_SOFT)
            .splits(H17_SPLITS)
            .strict(self.chart.strict)
            .build()
    }

    /// Prototype strategy; workers take fresh instances of it.
    pub fn strategy(&self) -> Box<dyn TrackingStrategy> {
        match self.strategy.kind {
            StrategyKind::Flatbet => Box::new(FlatBet::new()),
            StrategyKind::Hilo => Box::new(
                HighLow::new(self.strategy.spread.clone())
                    .with_insurance_at(self.strategy.insurance_true_count),
            ),
        }
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            summary_json: self
                .outputs
                .summary_json
                .as_deref()
                .map(|t| resolve_template(&self.run_id, t)),
            summary_md: self
                .outputs
                .summary_md
                .as_deref()
                .map(|t| resolve_template(&self.run_id, t)),
            telemetry: self
                .outputs
                .telemetry
                .as_deref()
                .map(|t| resolve_template(&self.run_id, t)),
        }
    }
}

fn default_run_id() -> String {
    DEFAULT_RUN_ID.to_string()
}

/// Casino rules and shoe shape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_decks")]
    pub decks: usize,
    #[serde(default = "default_true")]
    pub dealer_hits_soft17: bool,
    #[serde(default = "default_true")]
    pub double_after_split: bool,
    #[serde(default)]
    pub resplit_aces: bool,
    #[serde(default = "default_max_splits")]
    pub max_splits: u8,
    /// Cut-card reserve in decks.
    #[serde(default = "default_penetration")]
    pub penetration: f64,
    #[serde(default = "default_bankroll")]
    pub bankroll: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        let rules = TableRules::default();
        Self {
            decks: DEFAULT_DECKS,
            dealer_hits_soft17: rules.dealer_hits_soft17,
            double_after_split: rules.double_after_split,
            resplit_aces: rules.resplit_aces,
            max_splits: rules.max_splits,
            penetration: DEFAULT_PENETRATION,
            bankroll: DEFAULT_BANKROLL,
        }
    }
}

impl TableConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_splits > blackjack_bot::MAX_SPLITS_LIMIT {
            return Err(ValidationError::InvalidField {
                field: "table.max_splits".to_string(),
                message: format!(
                    "at most {} splits per spot are supported",
                    blackjack_bot::MAX_SPLITS_LIMIT
                ),
            });
        }

        // one spot; wider spreads are checked against the strategy later
        let reserve = round_card_bound(self.decks, self.max_splits, 1);
        let cut_card = (self.penetration * DECK_SIZE as f64) as usize;
        if self.penetration.is_nan() || cut_card < reserve {
            return Err(ValidationError::InvalidField {
                field: "table.penetration".to_string(),
                message: format!(
                    "cut-card reserve of {cut_card} cards cannot finish a round with {} splits; need {reserve}",
                    self.max_splits
                ),
            });
        }

        Ok(())
    }
}

fn default_decks() -> usize {
    DEFAULT_DECKS
}

fn default_true() -> bool {
    true
}

fn default_max_splits() -> u8 {
    TableRules::default().max_splits
}

fn default_penetration() -> f64 {
    DEFAULT_PENETRATION
}

fn default_bankroll() -> f64 {
    DEFAULT_BANKROLL
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Flatbet,
    Hilo,
}

/// Counting and bet sizing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,
    /// True count thresholds to bids; ignored by the flat bettor.
    #[serde(default)]
    pub spread: Bidspread,
    #[serde(default)]
    pub insurance_true_count: Option<i32>,
}

impl StrategyConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.spread
            .validate()
            .map_err(|err| ValidationError::InvalidField {
                field: "strategy.spread".to_string(),
                message: err.to_string(),
            })?;

        if self.kind == StrategyKind::Flatbet && self.insurance_true_count.is_some() {
            return Err(ValidationError::InvalidField {
                field: "strategy.insurance_true_count".to_string(),
                message: "the flat bettor never insures; use kind: hilo".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChartConfig {
    /// Fail at startup if the chart leaves any reachable decision undefined.
    #[serde(default)]
    pub strict: bool,
}

/// How much to simulate and on how many threads.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_shoes")]
    pub shoes: u64,
    /// Defaults to the available cores.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_rounds_per_hour")]
    pub rounds_per_hour: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            shoes: DEFAULT_SHOES,
            workers: None,
            seed: DEFAULT_SEED,
            rounds_per_hour: DEFAULT_ROUNDS_PER_HOUR,
        }
    }
}

fn default_shoes() -> u64 {
    DEFAULT_SHOES
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_rounds_per_hour() -> usize {
    DEFAULT_ROUNDS_PER_HOUR
}

/// Output artifact configuration. Unset paths are not written.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OutputsConfig {
    #[serde(default)]
    pub summary_json: Option<String>,
    #[serde(default)]
    pub summary_md: Option<String>,
    /// JSON lines log written when structured logging is enabled.
    #[serde(default)]
    pub telemetry: Option<String>,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.summary_json", &self.summary_json),
            ("outputs.summary_md", &self.summary_md),
            ("outputs.telemetry", &self.telemetry),
        ] {
            let Some(value) = value else {
                continue;
            };
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to console output without structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub summary_json: Option<PathBuf>,
    pub summary_md: Option<PathBuf>,
    pub telemetry: Option<PathBuf>,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
