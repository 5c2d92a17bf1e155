//! TOML-driven DAO scenarios.
//!
//! A scenario names its participants by label, sets an optional start time
//! and engine config, then lists steps. Each step is one engine call (or a
//! clock/bank adjustment) and may declare the error kind it must fail with.
//!
//! ```toml
//! admin = "admin"
//! start = 1700000000
//!
//! [[steps]]
//! action = "contribute"
//! who = "alice"
//! amount = 1000
//!
//! [[steps]]
//! action = "advance"
//! secs = 3600
//!
//! [[steps]]
//! action = "contribute"
//! who = "alice"
//! amount = 1
//! expect = "WindowClosed"
//! ```

use ledgerflow_core::{Bank, Clock, ManualClock, SharedBank};
use ledgerflow_dao::{DaoConfig, DaoEngine, DaoError, DaoErrorKind, DaoEvent, Ledger};
use ledgerflow_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Engine wired to the simulated clock and bank.
pub type ScenarioEngine = DaoEngine<Arc<ManualClock>, SharedBank>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid scenario: {0}")]
    Dao(#[from] DaoError),

    #[error("Step {step} ({description}) failed: {error}")]
    Unexpected {
        step: usize,
        description: String,
        error: DaoError,
    },

    #[error("Step {step} ({description}) expected {expected}, but it succeeded")]
    ExpectedFailure {
        step: usize,
        description: String,
        expected: DaoErrorKind,
    },

    #[error("Step {step} ({description}) expected {expected}, got {actual}")]
    WrongError {
        step: usize,
        description: String,
        expected: DaoErrorKind,
        actual: DaoError,
    },
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_count() -> usize {
    1
}

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Label of the engine admin
    #[serde(default = "default_admin")]
    pub admin: String,
    /// Clock reading when the engine is created
    #[serde(default)]
    pub start: Timestamp,
    /// Replaces the configured engine parameters when present
    pub dao: Option<DaoConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl Scenario {
    /// Load a scenario from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read scenario '{}': {}", path.display(), e))?;
        contents
            .parse()
            .map_err(|e| anyhow::anyhow!("Scenario '{}': {}", path.display(), e))
    }
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// Error kind the step must fail with
    #[serde(default)]
    pub expect: Option<DaoErrorKind>,
}

/// What a step does. Participants are labels or literal addresses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Advance {
        secs: u64,
    },
    Contribute {
        who: String,
        amount: Amount,
    },
    Propose {
        who: String,
        #[serde(default)]
        name: String,
        amount: Amount,
        recipient: String,
    },
    Vote {
        who: String,
        proposal: u64,
    },
    /// Defaults to the admin as caller
    Execute {
        #[serde(default)]
        who: Option<String>,
        proposal: u64,
    },
    /// Defaults to the admin as caller
    Withdraw {
        #[serde(default)]
        who: Option<String>,
        amount: Amount,
        recipient: String,
    },
    /// Make the bank reject payments to `who`
    Block {
        who: String,
    },
    Unblock {
        who: String,
    },
    /// Make the bank fail its next `count` transfers
    FailNext {
        #[serde(default = "default_count")]
        count: usize,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Advance { secs } => write!(f, "advance {}s", secs),
            Action::Contribute { who, amount } => write!(f, "{} contributes {}", who, amount),
            Action::Propose { who, amount, recipient, .. } => {
                write!(f, "{} proposes {} to {}", who, amount, recipient)
            }
            Action::Vote { who, proposal } => write!(f, "{} votes on #{}", who, proposal),
            Action::Execute { proposal, .. } => write!(f, "execute #{}", proposal),
            Action::Withdraw { amount, recipient, .. } => {
                write!(f, "withdraw {} to {}", amount, recipient)
            }
            Action::Block { who } => write!(f, "block {}", who),
            Action::Unblock { who } => write!(f, "unblock {}", who),
            Action::FailNext { count } => write!(f, "fail next {} transfer(s)", count),
        }
    }
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Succeeded; engine calls carry their event
    Applied(Option<DaoEvent>),
    /// Failed with the declared error kind
    Rejected(DaoErrorKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub description: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalSummary {
    pub id: u64,
    pub name: String,
    pub amount: Amount,
    pub recipient: String,
    pub votes: Amount,
    pub executed: bool,
}

/// Final state after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub name: String,
    pub now: Timestamp,
    pub ledger: Ledger,
    pub quorum_threshold: Amount,
    pub investors: Vec<(String, Amount)>,
    pub proposals: Vec<ProposalSummary>,
    /// Bank balances of everyone paid during the run
    pub payouts: Vec<(String, Amount)>,
}

/// Runs scenario steps against a fresh engine.
pub struct ScenarioRunner {
    name: String,
    clock: Arc<ManualClock>,
    bank: SharedBank,
    engine: ScenarioEngine,
    admin: Address,
    labels: BTreeMap<Address, String>,
}

impl ScenarioRunner {
    /// Build the engine. `config` is used unless the scenario carries its own.
    pub fn new(scenario: &Scenario, config: DaoConfig) -> Result<Self, ScenarioError> {
        let config = scenario.dao.clone().unwrap_or(config);
        let clock = Arc::new(ManualClock::new(scenario.start));
        let bank = Bank::shared();
        let admin = resolve(&scenario.admin);
        let engine = DaoEngine::new(config, admin, Arc::clone(&clock), Arc::clone(&bank))?;

        let mut labels = BTreeMap::new();
        labels.insert(admin, scenario.admin.clone());

        info!(
            "Scenario '{}' starting at {} with admin {}",
            scenario.name, scenario.start, scenario.admin
        );

        Ok(Self {
            name: scenario.name.clone(),
            clock,
            bank,
            engine,
            admin,
            labels,
        })
    }

    pub fn engine(&self) -> &ScenarioEngine {
        &self.engine
    }

    pub fn bank(&self) -> &SharedBank {
        &self.bank
    }

    fn participant(&mut self, label: &str) -> Address {
        let address = resolve(label);
        self.labels.entry(address).or_insert_with(|| label.to_string());
        address
    }

    fn caller_or_admin(&mut self, label: &Option<String>) -> Address {
        match label {
            Some(label) => self.participant(label),
            None => self.admin,
        }
    }

    fn label_of(&self, address: &Address) -> String {
        self.labels
            .get(address)
            .cloned()
            .unwrap_or_else(|| address.short())
    }

    fn apply(&mut self, action: &Action) -> Result<Option<DaoEvent>, DaoError> {
        match action {
            Action::Advance { secs } => {
                let now = self.clock.advance(*secs);
                debug!("Clock advanced to {}", now);
                Ok(None)
            }
            Action::Contribute { who, amount } => {
                let who = self.participant(who);
                self.engine.contribute(who, *amount).map(Some)
            }
            Action::Propose { who, name, amount, recipient } => {
                let who = self.participant(who);
                let recipient = self.participant(recipient);
                self.engine
                    .create_proposal(who, name.as_str(), *amount, recipient)
                    .map(Some)
            }
            Action::Vote { who, proposal } => {
                let who = self.participant(who);
                self.engine.vote(who, *proposal).map(Some)
            }
            Action::Execute { who, proposal } => {
                let who = self.caller_or_admin(who);
                self.engine.execute_proposal(who, *proposal).map(Some)
            }
            Action::Withdraw { who, amount, recipient } => {
                let who = self.caller_or_admin(who);
                let recipient = self.participant(recipient);
                self.engine.withdraw(who, *amount, recipient).map(Some)
            }
            Action::Block { who } => {
                let who = self.participant(who);
                self.bank.lock().block(who);
                Ok(None)
            }
            Action::Unblock { who } => {
                let who = self.participant(who);
                self.bank.lock().unblock(&who);
                Ok(None)
            }
            Action::FailNext { count } => {
                self.bank.lock().fail_next(*count);
                Ok(None)
            }
        }
    }

    /// Run one step and check it against its expectation.
    pub fn run_step(&mut self, step: usize, entry: &Step) -> Result<StepReport, ScenarioError> {
        let description = entry.action.to_string();
        let result = self.apply(&entry.action);

        let outcome = match (result, entry.expect) {
            (Ok(event), None) => Outcome::Applied(event),
            (Err(error), Some(expected)) if error.kind() == expected => {
                debug!("Step {} rejected as expected: {}", step, error);
                Outcome::Rejected(expected)
            }
            (Ok(_), Some(expected)) => {
                return Err(ScenarioError::ExpectedFailure {
                    step,
                    description,
                    expected,
                })
            }
            (Err(error), None) => {
                return Err(ScenarioError::Unexpected {
                    step,
                    description,
                    error,
                })
            }
            (Err(actual), Some(expected)) => {
                return Err(ScenarioError::WrongError {
                    step,
                    description,
                    expected,
                    actual,
                })
            }
        };

        Ok(StepReport {
            step,
            description,
            outcome,
        })
    }

    /// Run every step in order, stopping at the first mismatch. Steps are
    /// numbered from 1.
    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<StepReport>, ScenarioError> {
        steps
            .iter()
            .enumerate()
            .map(|(i, step)| self.run_step(i + 1, step))
            .collect()
    }

    pub fn summary(&self) -> Result<Summary, ScenarioError> {
        let investors = self
            .engine
            .investors()
            .map(|i| (self.label_of(&i.address), i.contribution))
            .collect();

        let proposals = self
            .engine
            .proposals()
            .iter()
            .map(|p| ProposalSummary {
                id: p.id,
                name: p.name.clone(),
                amount: p.amount,
                recipient: self.label_of(&p.recipient),
                votes: p.votes,
                executed: p.executed,
            })
            .collect();

        let payouts = {
            let bank = self.bank.lock();
            let mut paid: Vec<Address> = bank.history().iter().map(|r| r.to).collect();
            paid.sort();
            paid.dedup();
            paid.into_iter()
                .map(|a| (self.label_of(&a), bank.balance_of(&a)))
                .collect()
        };

        Ok(Summary {
            name: self.name.clone(),
            now: self.clock.now(),
            ledger: self.engine.ledger().clone(),
            quorum_threshold: self.engine.quorum_threshold()?,
            investors,
            proposals,
            payouts,
        })
    }
}

/// Literal addresses parse as such; anything else is a label.
pub fn resolve(label: &str) -> Address {
    label
        .parse::<Address>()
        .unwrap_or_else(|_| Address::from_label(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
name = "basic"
start = 1000

[dao]
contribution_period = 10
voting_period = 10
quorum_percent = 50

[[steps]]
action = "contribute"
who = "alice"
amount = 600

[[steps]]
action = "contribute"
who = "bob"
amount = 400

[[steps]]
action = "propose"
who = "alice"
name = "Pay carol"
amount = 100
recipient = "carol"

[[steps]]
action = "vote"
who = "alice"
proposal = 0

[[steps]]
action = "execute"
proposal = 0
"#;

    fn runner(scenario: &Scenario) -> ScenarioRunner {
        ScenarioRunner::new(scenario, DaoConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_scenario() {
        let scenario: Scenario = BASIC.parse().unwrap();
        assert_eq!(scenario.name, "basic");
        assert_eq!(scenario.admin, "admin");
        assert_eq!(scenario.start, Timestamp::from_secs(1000));
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(
            scenario.steps[0].action,
            Action::Contribute {
                who: "alice".to_string(),
                amount: Amount::new(600),
            }
        );
        assert_eq!(
            scenario.steps[4].action,
            Action::Execute {
                who: None,
                proposal: 0,
            }
        );
    }

    #[test]
    fn test_parse_expect_and_defaults() {
        let scenario: Scenario = r#"
[[steps]]
action = "fail_next"

[[steps]]
action = "vote"
who = "bob"
proposal = 3
expect = "NotFound"
"#
        .parse()
        .unwrap();

        assert_eq!(scenario.steps[0].action, Action::FailNext { count: 1 });
        assert_eq!(scenario.steps[1].expect, Some(DaoErrorKind::NotFound));
        assert!(scenario.dao.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let err = "[[steps]]\naction = \"dance\"\n".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_run_basic_scenario() {
        let scenario: Scenario = BASIC.parse().unwrap();
        let mut runner = runner(&scenario);

        let reports = runner.run(&scenario.steps).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].step, 1);
        assert!(matches!(
            reports[4].outcome,
            Outcome::Applied(Some(DaoEvent::ProposalExecuted { .. }))
        ));

        let summary = runner.summary().unwrap();
        assert_eq!(summary.ledger.available(), Amount::new(900));
        assert_eq!(summary.quorum_threshold, Amount::new(500));
        assert_eq!(summary.payouts, vec![("carol".to_string(), Amount::new(100))]);
        assert!(summary.proposals[0].executed);
        assert_eq!(summary.proposals[0].recipient, "carol");
    }

    #[test]
    fn test_expected_error_is_accepted() {
        let scenario: Scenario = r#"
[[steps]]
action = "vote"
who = "mallory"
proposal = 0
expect = "Unauthorized"
"#
        .parse()
        .unwrap();
        let mut runner = runner(&scenario);

        let reports = runner.run(&scenario.steps).unwrap();
        assert_eq!(reports[0].outcome, Outcome::Rejected(DaoErrorKind::Unauthorized));
    }

    #[test]
    fn test_mismatches_abort() {
        let scenario: Scenario = r#"
[[steps]]
action = "contribute"
who = "alice"
amount = 5
expect = "WindowClosed"
"#
        .parse()
        .unwrap();
        let err = runner(&scenario).run(&scenario.steps).unwrap_err();
        assert!(matches!(err, ScenarioError::ExpectedFailure { step: 1, .. }));

        let scenario: Scenario = r#"
[[steps]]
action = "contribute"
who = "alice"
amount = 0
expect = "WindowClosed"
"#
        .parse()
        .unwrap();
        let err = runner(&scenario).run(&scenario.steps).unwrap_err();
        assert!(matches!(err, ScenarioError::WrongError { expected: DaoErrorKind::WindowClosed, .. }));

        let scenario: Scenario = "[[steps]]\naction = \"execute\"\nproposal = 9\n".parse().unwrap();
        let err = runner(&scenario).run(&scenario.steps).unwrap_err();
        assert!(err.to_string().contains("execute #9"));
    }

    #[test]
    fn test_blocked_recipient_rolls_back() {
        let scenario: Scenario = r#"
[[steps]]
action = "contribute"
who = "alice"
amount = 100

[[steps]]
action = "block"
who = "bob"

[[steps]]
action = "withdraw"
amount = 50
recipient = "bob"
expect = "TransferFailed"

[[steps]]
action = "unblock"
who = "bob"

[[steps]]
action = "withdraw"
amount = 50
recipient = "bob"
"#
        .parse()
        .unwrap();
        let mut runner = runner(&scenario);
        runner.run(&scenario.steps).unwrap();

        assert_eq!(runner.engine().available_funds(), Amount::new(50));
        assert_eq!(runner.bank().lock().balance_of(&resolve("bob")), Amount::new(50));
    }

    #[test]
    fn test_summary_with_near_max_treasury() {
        let scenario: Scenario = r#"
[[steps]]
action = "contribute"
who = "alice"
amount = "34028236692093846346337460743176821145"

[[steps]]
action = "execute"
proposal = 42
expect = "NotFound"
"#
        .parse()
        .unwrap();
        let mut runner = runner(&scenario);
        runner.run(&scenario.steps).unwrap();

        let summary = runner.summary().unwrap();
        assert_eq!(
            summary.quorum_threshold,
            Amount::new(17_014_118_346_046_923_173_168_730_371_588_410_573)
        );
    }

    #[test]
    fn test_resolve_literal_address() {
        let alice = Address::from_label("alice");
        assert_eq!(resolve(&alice.to_string()), alice);
        assert_eq!(resolve(&format!("{:x}", alice)), alice);
        assert_eq!(resolve("alice"), alice);
    }
}
