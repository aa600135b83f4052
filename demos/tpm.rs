use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{bail, eyre};

use timed_pattern::abstraction::ZoneAutomaton;
use timed_pattern::answer::{sort_answers, Answer, AnswerCounter, AnswerSink};
use timed_pattern::automaton::TimedAutomaton;
use timed_pattern::bm::{BoyerMoore, MatcherConfig};
use timed_pattern::fixtures::{self, FixtureParams, NUM_CASES};
use timed_pattern::naive;
use timed_pattern::word::{Encoding, LazyWord, TimedWord};

#[derive(Debug, Parser)]
#[command(author, version, about = "Timed pattern matching over a timed word")]
struct Cli {
    /// Pattern number (see `--list`).
    #[arg(short, long, value_name = "INT", default_value = "0")]
    case: usize,

    /// List the available patterns and exit.
    #[clap(long)]
    list: bool,

    /// Word file (stdin if absent).
    #[clap(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Read the word in binary format.
    #[clap(long)]
    binary: bool,

    /// Scale of the constants of pattern 3.
    #[clap(long, value_name = "FLOAT", default_value = "1.0")]
    resolution: f64,

    /// Length parameter of patterns 7 and 8.
    #[clap(long, value_name = "INT", default_value = "3")]
    length: usize,

    /// Match this many times (for timing).
    #[clap(long = "loop", value_name = "INT", default_value = "1")]
    repeat: usize,

    /// Only print the number of answers.
    #[clap(long)]
    count: bool,

    /// Print nothing but the log.
    #[clap(short, long)]
    quiet: bool,

    /// Use the streaming matcher.
    #[clap(long, conflicts_with = "naive")]
    online: bool,

    /// Use the reference matcher.
    #[clap(long)]
    naive: bool,

    /// Scan every window instead of using the skip table.
    #[clap(long)]
    no_skip: bool,

    /// Cross-check the result against the reference matcher.
    #[clap(long)]
    test: bool,

    /// Write the pattern and its zone automaton in DOT format to this prefix.
    #[clap(long, value_name = "PREFIX")]
    dot: Option<PathBuf>,
}

fn open_input(path: Option<&PathBuf>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn print_answers(answers: &mut [Answer]) -> io::Result<()> {
    sort_answers(answers);
    let mut out = io::BufWriter::new(io::stdout().lock());
    for answer in answers.iter() {
        writeln!(out, "{}\n", answer)?;
    }
    out.flush()
}

fn run(matcher: Option<&BoyerMoore>, ta: &TimedAutomaton, word: &TimedWord, sink: &mut impl AnswerSink) {
    match matcher {
        Some(matcher) => matcher.match_into(word, sink),
        None => naive::match_into(ta, word, sink),
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let args = Cli::parse();
    log::debug!("args = {:?}", args);

    if args.list {
        for n in 0..NUM_CASES {
            println!("{:>2}: {}", n, fixtures::name(n));
        }
        return Ok(());
    }

    let params = FixtureParams {
        resolution: args.resolution,
        length: args.length,
    };
    let ta = fixtures::case(args.case, &params).ok_or_else(|| eyre!("no pattern number {}", args.case))?;
    log::info!(
        "pattern {} ({}): {} states, {} clocks",
        args.case,
        fixtures::name(args.case),
        ta.num_states(),
        ta.num_clocks()
    );

    let encoding = if args.binary { Encoding::Binary } else { Encoding::Text };
    let input = open_input(args.input.as_ref())?;

    if args.online {
        if args.repeat != 1 || args.test {
            bail!("--online reads the word once; it cannot be combined with --loop or --test");
        }
        let mut word = LazyWord::new(input, encoding)?;
        let time_match = Instant::now();
        if args.count || args.quiet {
            let mut counter = AnswerCounter::default();
            naive::match_online(&ta, &mut word, &mut counter)?;
            if !args.quiet {
                println!("{}", counter.emitted());
            }
        } else {
            let mut answers = Vec::new();
            naive::match_online(&ta, &mut word, &mut answers)?;
            print_answers(&mut answers)?;
        }
        log::info!("matching: {:.3} s", time_match.elapsed().as_secs_f64());
        log::info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
        return Ok(());
    }

    let word = TimedWord::read(input, encoding)?;
    log::info!("word: {} events", word.len());

    let config = MatcherConfig {
        use_skip_table: !args.no_skip,
        ..MatcherConfig::default()
    };
    let matcher = (!args.naive).then(|| BoyerMoore::with_config(ta.clone(), config));

    if let Some(prefix) = &args.dot {
        let za = ZoneAutomaton::build(&ta);
        std::fs::write(prefix.with_extension("ta.dot"), ta.to_dot()?)?;
        std::fs::write(prefix.with_extension("za.dot"), za.to_dot()?)?;
        log::info!("wrote {}.{{ta,za}}.dot", prefix.display());
    }

    let time_match = Instant::now();
    let mut answers = Vec::new();
    let mut counter = AnswerCounter::default();
    for i in 0..args.repeat {
        if i + 1 == args.repeat && !args.count {
            answers.clear();
            run(matcher.as_ref(), &ta, &word, &mut answers);
        } else {
            counter = AnswerCounter::default();
            run(matcher.as_ref(), &ta, &word, &mut counter);
        }
    }
    log::info!(
        "matching: {:.3} s for {} round(s)",
        time_match.elapsed().as_secs_f64(),
        args.repeat
    );

    if args.test {
        let mut expected = naive::match_word(&ta, &word);
        let mut actual = Vec::new();
        run(matcher.as_ref(), &ta, &word, &mut actual);
        sort_answers(&mut expected);
        sort_answers(&mut actual);
        if actual != expected {
            bail!("{} answers, the reference matcher gives {}", actual.len(), expected.len());
        }
        log::info!("cross-check passed: {} answers", actual.len());
    }

    if !args.quiet {
        if args.count {
            println!("{}", counter.emitted());
        } else {
            print_answers(&mut answers)?;
        }
    }

    log::info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());

    Ok(())
}
