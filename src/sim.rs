use log::{debug, info, warn};

use election_sim::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::sim::config_reader::*;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error reading configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration file"))]
    ParsingConfig { source: serde_json::Error },
    #[snafu(display("Error reading the reference summary"))]
    OpeningReference { source: std::io::Error },
    #[snafu(display("Error parsing the reference summary"))]
    ParsingReference { source: serde_json::Error },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Policy {policy} has a weight for unknown attribute {name}"))]
    UnknownAttribute { policy: String, name: String },
    #[snafu(display("Candidate {candidate} takes a stance on unknown policy {policy}"))]
    UnknownPolicy { candidate: String, policy: String },
    #[snafu(display(
        "Candidate {candidate} has stance {stance}; expected 'supports' or 'opposes'"
    ))]
    UnknownStance { candidate: String, stance: String },
    #[snafu(display("Cannot use tiebreak mode {mode}"))]
    UnknownTiebreakMode { mode: String },
    #[snafu(display("Simulation failed: {source}"))]
    Simulation { source: SimErrors },
    #[snafu(display("Difference detected between the computed summary and the reference summary"))]
    ReferenceMismatch {},
}

pub type CliResult<T> = Result<T, CliError>;

pub mod config_reader {
    use super::*;

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct GenderAgeConfig {
        pub male: [f64; 4],
        pub female: [f64; 4],
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct LocationConfig {
        pub urban: f64,
        pub suburban: f64,
        pub rural: f64,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct PopulationConfig {
        pub size: usize,
        pub seed: Option<u64>,
        #[serde(rename = "genderAge")]
        pub gender_age: GenderAgeConfig,
        pub location: LocationConfig,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct PolicyConfig {
        pub name: String,
        pub description: String,
        pub weights: HashMap<String, f64>,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct StanceConfig {
        pub policy: String,
        pub stance: String,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct CandidateConfig {
        pub name: String,
        pub party: String,
        pub stances: Vec<StanceConfig>,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct RulesConfig {
        #[serde(rename = "tiebreakMode")]
        pub tiebreak_mode: String,
        #[serde(rename = "randomSeed")]
        pub random_seed: Option<u32>,
    }

    #[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct ScenarioConfig {
        pub population: PopulationConfig,
        pub policies: Vec<PolicyConfig>,
        pub candidates: Vec<CandidateConfig>,
        pub rules: Option<RulesConfig>,
        pub systems: Option<Vec<String>>,
    }
}

/// A fully validated scenario, ready to run.
pub struct Scenario {
    pub size: usize,
    pub seed: Option<u64>,
    pub distribution: VoterDistribution,
    pub candidates: Vec<Candidate>,
    pub rules: TallyRules,
    pub systems: Vec<VotingSystem>,
}

fn parse_attribute(policy: &str, name: &str) -> CliResult<Attribute> {
    Attribute::ALL
        .iter()
        .copied()
        .find(|attribute| attribute.name() == name)
        .context(UnknownAttributeSnafu {
            policy: policy.to_string(),
            name: name.to_string(),
        })
}

fn validate_rules(config: &Option<RulesConfig>) -> CliResult<TallyRules> {
    let rules = match config {
        None => TallyRules::DEFAULT_RULES,
        Some(rc) => TallyRules {
            tiebreak_mode: match rc.tiebreak_mode.as_str() {
                "slateOrder" => TieBreakMode::SlateOrder,
                "random" => match rc.random_seed {
                    Some(seed) => TieBreakMode::Random(seed),
                    None => {
                        return UnknownTiebreakModeSnafu {
                            mode: "random without a randomSeed".to_string(),
                        }
                        .fail();
                    }
                },
                x => {
                    return UnknownTiebreakModeSnafu {
                        mode: x.to_string(),
                    }
                    .fail();
                }
            },
        },
    };
    Ok(rules)
}

/// Turns the parsed configuration into library values, resolving attribute
/// names, stance policy references and system names.
pub fn build_scenario(config: &ScenarioConfig) -> CliResult<Scenario> {
    let mut gender_age = [0.0; 8];
    gender_age[..4].copy_from_slice(&config.population.gender_age.male);
    gender_age[4..].copy_from_slice(&config.population.gender_age.female);
    let location = [
        config.population.location.urban,
        config.population.location.suburban,
        config.population.location.rural,
    ];
    let distribution = VoterDistribution::new(gender_age, location).context(SimulationSnafu)?;

    let mut policies: Vec<Policy> = Vec::new();
    for pc in config.policies.iter() {
        let mut weights: HashMap<Attribute, f64> = HashMap::new();
        for (name, &weight) in pc.weights.iter() {
            weights.insert(parse_attribute(&pc.name, name)?, weight);
        }
        policies.push(Policy::new(&pc.name, &pc.description, weights).context(SimulationSnafu)?);
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for cc in config.candidates.iter() {
        let mut stances: Vec<(Policy, Stance)> = Vec::new();
        for sc in cc.stances.iter() {
            let policy = policies
                .iter()
                .find(|policy| policy.name() == sc.policy)
                .context(UnknownPolicySnafu {
                    candidate: cc.name.clone(),
                    policy: sc.policy.clone(),
                })?
                .clone();
            let stance = match sc.stance.as_str() {
                "supports" => Stance::Supports,
                "opposes" => Stance::Opposes,
                x => {
                    return UnknownStanceSnafu {
                        candidate: cc.name.clone(),
                        stance: x.to_string(),
                    }
                    .fail();
                }
            };
            stances.push((policy, stance));
        }
        candidates.push(Candidate::new(&cc.name, &cc.party, stances));
    }

    let rules = validate_rules(&config.rules)?;
    let systems = parse_systems(&config.systems)?;

    Ok(Scenario {
        size: config.population.size,
        seed: config.population.seed,
        distribution,
        candidates,
        rules,
        systems,
    })
}

fn parse_systems(names: &Option<Vec<String>>) -> CliResult<Vec<VotingSystem>> {
    match names {
        None => Ok(VotingSystem::ALL.to_vec()),
        Some(names) => names
            .iter()
            .map(|name| name.parse::<VotingSystem>().context(SimulationSnafu))
            .collect(),
    }
}

/// Samples the population, scores the election and tallies every requested
/// system.
pub fn run_scenario(scenario: &Scenario) -> CliResult<Vec<(VotingSystem, TallyResult)>> {
    info!("sampling {} voters", scenario.size);
    let population = generate_population(scenario.size, &scenario.distribution, scenario.seed)
        .context(SimulationSnafu)?;
    let election =
        Election::build(scenario.candidates.clone(), &population).context(SimulationSnafu)?;

    let mut results: Vec<(VotingSystem, TallyResult)> = Vec::new();
    for system in scenario.systems.iter() {
        let result = tally_with_rules(*system, &election, &scenario.rules).context(SimulationSnafu)?;
        info!("{}: winner {}", system.name(), result.winner);
        for round in result.rounds.iter() {
            info!("  round {}: {:?}", round.round, round.tally);
        }
        results.push((*system, result));
    }
    Ok(results)
}

fn result_rounds_to_json(result: &TallyResult) -> Vec<JSValue> {
    let mut rounds: Vec<JSValue> = Vec::new();
    for round in result.rounds.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round.eliminated.iter() {
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            for (name, count) in elim_stats.transfers.iter() {
                transfers.insert(name.clone(), json!(count.to_string()));
            }
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers
            }));
        }
        for winner_name in round.elected.iter() {
            tally_results.push(json!({
                "elected": winner_name,
                "transfers": {}
            }));
        }

        rounds.push(json!({"round": round.round, "tally": tally, "tallyResults": tally_results}));
    }
    rounds
}

fn build_summary_js(results: &[(VotingSystem, TallyResult)]) -> JSValue {
    let mut list: Vec<JSValue> = Vec::new();
    for (system, result) in results.iter() {
        list.push(json!({
            "system": system.name(),
            "winner": result.winner,
            "threshold": result.threshold,
            "rounds": result_rounds_to_json(result),
        }));
    }
    json!({ "results": list })
}

fn read_summary(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningReferenceSnafu {})?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingReferenceSnafu {})?;
    Ok(js)
}

/// The built-in scenario: the census gender/age joint table, the
/// urban/suburban/rural split and the four-issue, four-candidate slate of
/// the reference campaign setting.
pub fn default_config() -> ScenarioConfig {
    fn weights(entries: [f64; 9]) -> HashMap<String, f64> {
        Attribute::ALL
            .iter()
            .map(|attribute| attribute.name().to_string())
            .zip(entries)
            .collect()
    }
    fn stance(policy: &str, stance: &str) -> StanceConfig {
        StanceConfig {
            policy: policy.to_string(),
            stance: stance.to_string(),
        }
    }

    ScenarioConfig {
        population: PopulationConfig {
            size: 10_000,
            seed: None,
            gender_age: GenderAgeConfig {
                male: [0.024, 0.205, 0.158, 0.101],
                female: [0.023, 0.205, 0.164, 0.120],
            },
            location: LocationConfig {
                urban: 0.31,
                suburban: 0.55,
                rural: 0.14,
            },
        },
        // Attribute order: male, female, under21, under45, under65, over65,
        // urban, suburban, rural.
        policies: vec![
            PolicyConfig {
                name: "technologyUse".to_string(),
                description: "Congress is proposing a strict five hour limit on recreational \
                              internet use."
                    .to_string(),
                weights: weights([0.45, 0.50, 0.08, 0.30, 0.55, 0.80, 0.35, 0.50, 0.60]),
            },
            PolicyConfig {
                name: "universalHealthcare".to_string(),
                description: "A petition asks the government to provide universal healthcare, \
                              citing the poor health of low and middle-class workers."
                    .to_string(),
                weights: weights([0.50, 0.60, 0.60, 0.55, 0.50, 0.45, 0.65, 0.50, 0.35]),
            },
            PolicyConfig {
                name: "financialAid".to_string(),
                description: "Students are demanding more financial aid against the rising cost \
                              of university."
                    .to_string(),
                weights: weights([0.45, 0.55, 0.85, 0.60, 0.35, 0.25, 0.60, 0.50, 0.40]),
            },
            PolicyConfig {
                name: "airQuality".to_string(),
                description: "The environmentalist movement demands an end to all toxic \
                              emissions after a sudden rise in temperatures."
                    .to_string(),
                weights: weights([0.45, 0.55, 0.75, 0.60, 0.45, 0.35, 0.70, 0.50, 0.30]),
            },
        ],
        candidates: vec![
            CandidateConfig {
                name: "Justin Case".to_string(),
                party: "Birthday Party".to_string(),
                stances: vec![
                    stance("technologyUse", "supports"),
                    stance("universalHealthcare", "supports"),
                    stance("financialAid", "supports"),
                    stance("airQuality", "supports"),
                ],
            },
            CandidateConfig {
                name: "Jason Response".to_string(),
                party: "Abolish Political Parties Party".to_string(),
                stances: vec![
                    stance("technologyUse", "supports"),
                    stance("universalHealthcare", "supports"),
                    stance("financialAid", "opposes"),
                    stance("airQuality", "opposes"),
                ],
            },
            CandidateConfig {
                name: "Ruud van Driver".to_string(),
                party: "The Best Party".to_string(),
                stances: vec![
                    stance("technologyUse", "opposes"),
                    stance("universalHealthcare", "supports"),
                    stance("financialAid", "supports"),
                    stance("airQuality", "supports"),
                ],
            },
            CandidateConfig {
                name: "Janelle Lawless".to_string(),
                party: "Independent".to_string(),
                stances: vec![
                    stance("technologyUse", "opposes"),
                    stance("universalHealthcare", "opposes"),
                    stance("financialAid", "opposes"),
                    stance("airQuality", "opposes"),
                ],
            },
        ],
        rules: None,
        systems: None,
    }
}

fn load_config(path: &Option<String>) -> CliResult<ScenarioConfig> {
    match path {
        Some(path) => {
            let contents =
                fs::read_to_string(path).context(OpeningConfigSnafu { path: path.clone() })?;
            serde_json::from_str(&contents).context(ParsingConfigSnafu {})
        }
        None => {
            info!("no configuration file given, using the built-in reference scenario");
            Ok(default_config())
        }
    }
}

pub fn run_simulation(args: &Args) -> CliResult<()> {
    let config = load_config(&args.config)?;
    debug!("configuration: {:?}", config);

    let mut scenario = build_scenario(&config)?;
    if let Some(size) = args.population {
        scenario.size = size;
    }
    if let Some(seed) = args.seed {
        scenario.seed = Some(seed);
    }
    if let Some(systems) = &args.systems {
        scenario.systems = parse_systems(&Some(systems.clone()))?;
    }

    let results = run_scenario(&scenario)?;
    let summary = build_summary_js(&results);
    let pretty_js_stats =
        serde_json::to_string_pretty(&summary).context(SerializingSummarySnafu {})?;
    match &args.out {
        Some(path) if path != "stdout" => {
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path: path.clone() })?;
        }
        _ => println!("{}", pretty_js_stats),
    }

    // The reference summary, if provided for comparison
    if let Some(summary_path) = &args.reference {
        let summary_ref = read_summary(summary_path)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingSummarySnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(())
}
