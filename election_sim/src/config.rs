// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

/// The gender axis of a voter profile.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn attribute(self) -> Attribute {
        match self {
            Gender::Male => Attribute::Male,
            Gender::Female => Attribute::Female,
        }
    }
}

/// The age axis of a voter profile.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AgeBracket {
    /// 18 to 20 years old
    Under21,
    /// 21 to 44 years old
    Under45,
    /// 45 to 64 years old
    Under65,
    /// 65 years and over
    Over65,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Under21,
        AgeBracket::Under45,
        AgeBracket::Under65,
        AgeBracket::Over65,
    ];

    pub fn attribute(self) -> Attribute {
        match self {
            AgeBracket::Under21 => Attribute::Under21,
            AgeBracket::Under45 => Attribute::Under45,
            AgeBracket::Under65 => Attribute::Under65,
            AgeBracket::Over65 => Attribute::Over65,
        }
    }
}

/// The location axis of a voter profile.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Location {
    Urban,
    Suburban,
    Rural,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Urban, Location::Suburban, Location::Rural];

    pub fn attribute(self) -> Attribute {
        match self {
            Location::Urban => Attribute::Urban,
            Location::Suburban => Attribute::Suburban,
            Location::Rural => Attribute::Rural,
        }
    }
}

/// A flat view over every axis value. This is the key type for policy weight
/// tables, which carry one entry per attribute rather than per combination.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Attribute {
    Male,
    Female,
    Under21,
    Under45,
    Under65,
    Over65,
    Urban,
    Suburban,
    Rural,
}

impl Attribute {
    /// Every attribute the sampler can produce, axis by axis.
    pub const ALL: [Attribute; 9] = [
        Attribute::Male,
        Attribute::Female,
        Attribute::Under21,
        Attribute::Under45,
        Attribute::Under65,
        Attribute::Over65,
        Attribute::Urban,
        Attribute::Suburban,
        Attribute::Rural,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Male => "male",
            Attribute::Female => "female",
            Attribute::Under21 => "under21",
            Attribute::Under45 => "under45",
            Attribute::Under65 => "under65",
            Attribute::Over65 => "over65",
            Attribute::Urban => "urban",
            Attribute::Suburban => "suburban",
            Attribute::Rural => "rural",
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One synthetic voter: exactly one value per axis, fixed at sampling time.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Demographic {
    pub gender: Gender,
    pub age: AgeBracket,
    pub location: Location,
}

impl Demographic {
    pub fn new(gender: Gender, age: AgeBracket, location: Location) -> Demographic {
        Demographic {
            gender,
            age,
            location,
        }
    }

    /// The three attributes present in this profile.
    pub fn attributes(&self) -> [Attribute; 3] {
        [
            self.gender.attribute(),
            self.age.attribute(),
            self.location.attribute(),
        ]
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.attributes().contains(&attribute)
    }
}

/// A ballot issue with a weight table over individual attributes.
///
/// Each weight is the probability that a voter with that single attribute
/// votes YES on the issue. Attributes are treated as statistically
/// independent contributions, so the approval probability of a full profile
/// is the product of its three matching weights.
#[derive(PartialEq, Debug, Clone)]
pub struct Policy {
    name: String,
    description: String,
    weights: HashMap<Attribute, f64>,
}

impl Policy {
    /// Builds a policy, checking that the weight table has an entry for
    /// every attribute the sampler can produce and that every weight is a
    /// probability. A partial table is a configuration error, never a
    /// silent default.
    pub fn new(
        name: &str,
        description: &str,
        weights: HashMap<Attribute, f64>,
    ) -> Result<Policy, SimErrors> {
        for attribute in Attribute::ALL {
            match weights.get(&attribute) {
                None => {
                    return Err(SimErrors::MissingWeight {
                        policy: name.to_string(),
                        attribute,
                    });
                }
                Some(&weight) if !(0.0..=1.0).contains(&weight) => {
                    return Err(SimErrors::WeightOutOfRange {
                        policy: name.to_string(),
                        attribute,
                        weight,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(Policy {
            name: name.to_string(),
            description: description.to_string(),
            weights,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Approval probability of this issue for one voter, in [0, 1].
    pub fn approval(&self, voter: &Demographic) -> f64 {
        voter
            .attributes()
            .iter()
            .map(|attribute| self.weights[attribute])
            .product()
    }
}

/// A candidate's position on one policy.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Stance {
    Supports,
    Opposes,
}

impl Stance {
    pub fn sign(self) -> f64 {
        match self {
            Stance::Supports => 1.0,
            Stance::Opposes => -1.0,
        }
    }
}

/// A named candidate with a party label and an ordered list of stances.
#[derive(PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    /// Display only, never used by the tally rules.
    pub party: String,
    stances: Vec<(Policy, Stance)>,
}

impl Candidate {
    pub fn new(name: &str, party: &str, stances: Vec<(Policy, Stance)>) -> Candidate {
        Candidate {
            name: name.to_string(),
            party: party.to_string(),
            stances,
        }
    }

    /// Net agreement of one voter with this candidate.
    ///
    /// Each stance contributes the policy approval centered on 0.5, the
    /// indifference point, with the sign flipped when the candidate opposes
    /// the issue. The range is [-0.5 * k, 0.5 * k] for k stances, so raw
    /// scores are only comparable across candidates with equally sized
    /// stance lists.
    pub fn approval(&self, voter: &Demographic) -> f64 {
        self.stances
            .iter()
            .map(|(policy, stance)| (policy.approval(voter) - 0.5) * stance.sign())
            .sum()
    }

    pub fn stances(&self) -> &[(Policy, Stance)] {
        &self.stances
    }
}

// Tolerance when checking that a probability table sums to one.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The sampling distribution of one synthetic electorate.
///
/// Gender and age are supplied jointly (census sources publish them as a
/// joint statistic): 8 entries in `Gender::ALL` x `AgeBracket::ALL` order,
/// male row first. Location is an independent marginal with 3 entries in
/// `Location::ALL` order. The full distribution over the 24 outcomes is the
/// product of the two tables.
#[derive(PartialEq, Debug, Clone)]
pub struct VoterDistribution {
    gender_age: [f64; 8],
    location: [f64; 3],
}

impl VoterDistribution {
    /// Validates both tables: every entry must be a probability and each
    /// table must sum to one within a floating tolerance.
    pub fn new(gender_age: [f64; 8], location: [f64; 3]) -> Result<VoterDistribution, SimErrors> {
        check_probability_table("genderAge", &gender_age)?;
        check_probability_table("location", &location)?;
        Ok(VoterDistribution {
            gender_age,
            location,
        })
    }

    pub(crate) fn gender_age(&self) -> &[f64; 8] {
        &self.gender_age
    }

    pub(crate) fn location(&self) -> &[f64; 3] {
        &self.location
    }
}

fn check_probability_table(axis: &str, table: &[f64]) -> Result<(), SimErrors> {
    for &value in table {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimErrors::InvalidProbability {
                axis: axis.to_string(),
                value,
            });
        }
    }
    let total: f64 = table.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(SimErrors::DistributionSum {
            axis: axis.to_string(),
            total,
        });
    }
    Ok(())
}

// ********* Tally configuration **********

/// The supported vote-tallying rules.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingSystem {
    PopularVote,
    FirstPastThePost,
    ApprovalVoting,
    RankedChoice,
}

impl VotingSystem {
    pub const ALL: [VotingSystem; 4] = [
        VotingSystem::PopularVote,
        VotingSystem::FirstPastThePost,
        VotingSystem::ApprovalVoting,
        VotingSystem::RankedChoice,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VotingSystem::PopularVote => "popularVote",
            VotingSystem::FirstPastThePost => "firstPastThePost",
            VotingSystem::ApprovalVoting => "approvalVoting",
            VotingSystem::RankedChoice => "rankedChoice",
        }
    }
}

impl std::str::FromStr for VotingSystem {
    type Err = SimErrors;

    fn from_str(s: &str) -> Result<VotingSystem, SimErrors> {
        VotingSystem::ALL
            .iter()
            .copied()
            .find(|system| system.name() == s)
            .ok_or_else(|| SimErrors::UnknownSystem(s.to_string()))
    }
}

/// How exact ties are resolved.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Ties for election go to the earliest slate entry; ties for
    /// elimination remove the latest slate entry.
    SlateOrder,
    /// Candidates are ordered by a cryptographic digest of the seed, the
    /// round number and the candidate name. Hard to predict in advance but
    /// fully reproducible for a fixed seed.
    Random(u32),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub tiebreak_mode: TieBreakMode,
}

impl TallyRules {
    pub const DEFAULT_RULES: TallyRules = TallyRules {
        tiebreak_mode: TieBreakMode::SlateOrder,
    };
}

// ******** Output data structures *********

/// Where the ballots of an eliminated candidate went.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub name: String,
    pub transfers: Vec<(String, u64)>,
}

/// Counts for one tally round, in slate order. Single-round systems produce
/// exactly one of these; ranked choice produces one per elimination round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    pub elected: Vec<String>,
    pub eliminated: Vec<EliminationStats>,
}

/// The outcome of running one voting system over an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub winner: String,
    /// The majority threshold, for systems that have one.
    pub threshold: Option<u64>,
    pub rounds: Vec<RoundStats>,
}

/// Errors raised when a scenario is misconfigured or an election cannot be
/// tallied. All of them abort the run; no partial results are produced.
#[derive(PartialEq, Debug, Clone)]
pub enum SimErrors {
    EmptyPopulation,
    EmptySlate,
    DuplicateCandidate(String),
    MissingWeight {
        policy: String,
        attribute: Attribute,
    },
    WeightOutOfRange {
        policy: String,
        attribute: Attribute,
        weight: f64,
    },
    InvalidProbability {
        axis: String,
        value: f64,
    },
    DistributionSum {
        axis: String,
        total: f64,
    },
    UnknownSystem(String),
    NoConvergence,
}

impl Error for SimErrors {}

impl Display for SimErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErrors::EmptyPopulation => write!(f, "the population is empty"),
            SimErrors::EmptySlate => write!(f, "the candidate slate is empty"),
            SimErrors::DuplicateCandidate(name) => {
                write!(f, "duplicate candidate in the slate: {}", name)
            }
            SimErrors::MissingWeight { policy, attribute } => write!(
                f,
                "policy {} has no weight for attribute {}",
                policy, attribute
            ),
            SimErrors::WeightOutOfRange {
                policy,
                attribute,
                weight,
            } => write!(
                f,
                "policy {} has weight {} for attribute {}, outside [0, 1]",
                policy, weight, attribute
            ),
            SimErrors::InvalidProbability { axis, value } => write!(
                f,
                "probability {} in the {} table is outside [0, 1]",
                value, axis
            ),
            SimErrors::DistributionSum { axis, total } => {
                write!(f, "the {} table sums to {}, expected 1", axis, total)
            }
            SimErrors::UnknownSystem(name) => write!(f, "unknown voting system: {}", name),
            SimErrors::NoConvergence => write!(f, "the tally did not converge to a winner"),
        }
    }
}
