use std::collections::HashSet as DedupSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use hamt_set::HashSet;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

const DEFAULT_DICT: &str = "/usr/share/dict/american-english";

fn random_word(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..256);
    (0..len).map(|_| rng.gen_range(32u8..126) as char).collect()
}

/// Word list to drive the set with: `--dict <path>`, the system dictionary
/// if one is installed, or `--size <n>` random printable words.
fn load_words(args: &mut pico_args::Arguments) -> anyhow::Result<Vec<String>> {
    let dict: Option<PathBuf> = args.opt_value_from_str("--dict")?;
    let size: usize = args.opt_value_from_str("--size")?.unwrap_or(100_000);

    let dict = dict.or_else(|| {
        let default = PathBuf::from(DEFAULT_DICT);
        default.exists().then_some(default)
    });

    if let Some(path) = dict {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read word list {}", path.display()))?;
        let mut words: Vec<String> = contents.lines().map(str::to_owned).collect();
        words.sort();
        words.dedup();
        info!("loaded {} words from {}", words.len(), path.display());
        Ok(words)
    } else {
        let mut rng = rand::thread_rng();
        let mut seen = DedupSet::new();
        let mut words = Vec::with_capacity(size);
        while words.len() < size {
            let word = random_word(&mut rng);
            if seen.insert(word.clone()) {
                words.push(word);
            }
        }
        info!("generated {} random words", words.len());
        Ok(words)
    }
}

fn timed(name: &str, ops: usize, f: impl FnOnce()) {
    let start = Instant::now();
    f();
    let elapsed = start.elapsed();
    println!("{name}:");
    println!("    total: {:.3} s", elapsed.as_secs_f64());
    println!(
        "    per op: {:.1} ns",
        elapsed.as_nanos() as f64 / ops.max(1) as f64
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();
    let mut words = load_words(&mut args)?;
    let rest = args.finish();
    anyhow::ensure!(rest.is_empty(), "unrecognized arguments: {rest:?}");

    let mut rng = rand::thread_rng();
    let mut set = HashSet::new();

    timed("insertion", words.len(), || {
        for word in &words {
            set.insert(word.clone());
        }
    });
    assert_eq!(set.len(), words.len());

    let mut hits = 0usize;
    timed("lookup, all hits", words.len(), || {
        for word in &words {
            hits += usize::from(set.contains(word));
        }
    });
    assert_eq!(hits, words.len(), "inserted words must all be present");

    let probes: Vec<String> = words.iter().map(|word| format!("{word}~")).collect();
    let mut misses = 0usize;
    timed("lookup, all misses", probes.len(), || {
        for probe in &probes {
            misses += usize::from(!set.contains(probe));
        }
    });
    assert_eq!(misses, probes.len(), "suffixed words must all be absent");

    words.shuffle(&mut rng);
    let half = words.len() / 2;
    timed("removal, first half", half, || {
        for word in &words[..half] {
            assert!(set.remove(word));
        }
    });
    for word in &words[..half] {
        assert!(!set.contains(word), "removed word resurfaced");
    }
    for word in &words[half..] {
        assert!(set.contains(word), "surviving word went missing");
    }

    timed("removal, second half", words.len() - half, || {
        for word in &words[half..] {
            assert!(set.remove(word));
        }
    });
    assert!(set.is_empty());

    println!("verified {} words inserted, found, and removed", words.len());
    Ok(())
}
