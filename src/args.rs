use clap::Parser;

/// Samples a synthetic electorate, scores it against a candidate slate and
/// tallies the winner under several electoral systems.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) JSON scenario configuration: the population
    /// distribution, the ballot issues with their weight tables, the
    /// candidate slate and the tally rules. Without it, the built-in
    /// reference scenario is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) A reference summary in JSON format. If provided,
    /// the computed summary must match it and any difference fails the run.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') Where to write the JSON summary of the run.
    /// Defaults to stdout.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (repeatable, optional) A voting system to tally, by name:
    /// popularVote, firstPastThePost, approvalVoting or rankedChoice.
    /// All four run when not specified.
    #[clap(short, long, value_parser)]
    pub systems: Option<Vec<String>>,

    /// (integer, optional) Overrides the population size from the
    /// configuration.
    #[clap(short, long, value_parser)]
    pub population: Option<usize>,

    /// (integer, optional) Overrides the sampling seed from the
    /// configuration, making the drawn population reproducible.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
