//! Random Turtle fixtures for the service under test.
//!
//! Two shapes are supported: *wide* person records with a growing number of literal fields and
//! *chains* of persons linked with `ex:relatedWith`.
use fs_err::File;
use log::{debug, info};
use rand::Rng;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// First line of every generated fixture.
pub const PREFIX: &str = "@prefix ex:    <http://example.org/> .";
/// File name used by the wide fixture when none is given.
pub const WIDE_FILE: &str = "growing_field_data.ttl";
/// File name used by the chain fixture when none is given.
pub const CHAIN_FILE: &str = "nested_person_data.ttl";
/// Length of each random literal value.
pub const VALUE_LEN: usize = 10;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Range the `ex:relatedWith` target of a chain fixture is drawn from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChainTarget {
    /// `[1, n]`: can point at `person_n`, which does not exist, and never at `person_0`.
    #[default]
    OneBased,
    /// `[0, n)`: every target is an existing entity.
    ZeroBased,
}

impl ChainTarget {
    fn pick<R: Rng>(self, rng: &mut R, entity_count: usize) -> usize {
        match self {
            ChainTarget::OneBased => rng.random_range(1..=entity_count),
            ChainTarget::ZeroBased => rng.random_range(0..entity_count),
        }
    }
}

/// Random string of `len` ASCII letters.
pub fn random_chars<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char).collect()
}

/// Write `entity_count` persons with `field_count` random literal fields each.
pub fn generate_wide<W: Write, R: Rng>(
    writer: &mut W, rng: &mut R, entity_count: usize, field_count: usize,
) -> io::Result<()> {
    writeln!(writer, "{PREFIX}")?;
    for i in 0..entity_count {
        if field_count == 0 {
            writeln!(writer, "ex:person_{i} a ex:Person.")?;
            continue;
        }
        writeln!(writer, "ex:person_{i} a ex:Person;")?;
        for j in 1..=field_count {
            // the statement ends after the last property
            let terminator = if j == field_count { '.' } else { ';' };
            writeln!(writer, "   ex:field_{j} \"{}\"{terminator}", random_chars(rng, VALUE_LEN))?;
        }
    }
    Ok(())
}

/// Write `entity_count` persons, each related to one randomly chosen person.
/// Self loops and cycles are allowed.
pub fn generate_chain<W: Write, R: Rng>(
    writer: &mut W, rng: &mut R, entity_count: usize, target: ChainTarget,
) -> io::Result<()> {
    writeln!(writer, "{PREFIX}")?;
    for i in 0..entity_count {
        let related = target.pick(rng, entity_count);
        writeln!(writer, "ex:person_{i} a ex:Person;\n   ex:relatedWith ex:person_{related}.")?;
    }
    Ok(())
}

/// Create or overwrite `path` with a wide fixture.
pub fn write_wide<R: Rng>(
    path: &Path, rng: &mut R, entity_count: usize, field_count: usize,
) -> io::Result<()> {
    debug!("generating {entity_count} persons with {field_count} fields into {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    generate_wide(&mut writer, rng, entity_count, field_count)?;
    writer.flush()?;
    info!("wrote wide fixture {}", path.display());
    Ok(())
}

/// Create or overwrite `path` with a chain fixture.
pub fn write_chain<R: Rng>(
    path: &Path, rng: &mut R, entity_count: usize, target: ChainTarget,
) -> io::Result<()> {
    debug!("generating {entity_count} linked persons ({target:?}) into {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    generate_chain(&mut writer, rng, entity_count, target)?;
    writer.flush()?;
    info!("wrote chain fixture {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::init;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn wide(entity_count: usize, field_count: usize) -> String {
        let mut buf = Vec::new();
        let mut rng = StdRng::seed_from_u64(42);
        generate_wide(&mut buf, &mut rng, entity_count, field_count).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn chain(entity_count: usize, target: ChainTarget) -> String {
        let mut buf = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);
        generate_chain(&mut buf, &mut rng, entity_count, target).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn triple_count(ttl: &str) -> usize {
        oxttl::TurtleParser::new().for_slice(ttl.as_bytes()).map(|t| t.unwrap()).count()
    }

    #[test]
    fn wide_blocks() {
        init();
        let ttl = wide(3, 2);
        let lines: Vec<&str> = ttl.lines().collect();
        assert_eq!(lines[0], PREFIX);
        // prefix + 3 * (type line + 2 fields)
        assert_eq!(lines.len(), 1 + 3 * 3);
        assert_eq!(lines[1], "ex:person_0 a ex:Person;");
        assert!(lines[2].starts_with("   ex:field_1 \""));
        assert!(lines[2].ends_with("\";"));
        assert!(lines[3].starts_with("   ex:field_2 \""));
        assert!(lines[3].ends_with("\"."));
        assert_eq!(lines[7], "ex:person_2 a ex:Person;");
        assert_eq!(ttl.matches(" a ex:Person;").count(), 3);
        assert_eq!(ttl.matches("ex:field_").count(), 6);
    }

    #[test]
    fn wide_values() {
        init();
        let ttl = wide(2, 5);
        for line in ttl.lines().filter(|l| l.contains("ex:field_")) {
            let value = line.split('"').nth(1).unwrap();
            assert_eq!(value.len(), VALUE_LEN);
            assert!(value.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn wide_is_turtle() {
        init();
        // one rdf:type triple per entity plus one per field
        assert_eq!(triple_count(&wide(4, 3)), 4 * 4);
        assert_eq!(triple_count(&wide(2, 0)), 2);
        assert_eq!(triple_count(&wide(0, 3)), 0);
    }

    #[test]
    fn chain_one_based() {
        init();
        let n = 50;
        let ttl = chain(n, ChainTarget::OneBased);
        assert_eq!(triple_count(&ttl), 2 * n);
        for (i, block) in ttl.lines().skip(1).collect::<Vec<_>>().chunks(2).enumerate() {
            assert_eq!(block[0], format!("ex:person_{i} a ex:Person;"));
            let target: usize =
                block[1].trim_start_matches("   ex:relatedWith ex:person_").trim_end_matches('.').parse().unwrap();
            assert!((1..=n).contains(&target));
        }
    }

    #[test]
    fn chain_zero_based() {
        init();
        let n = 20;
        let ttl = chain(n, ChainTarget::ZeroBased);
        for line in ttl.lines().filter(|l| l.contains("relatedWith")) {
            let target: usize =
                line.trim_start_matches("   ex:relatedWith ex:person_").trim_end_matches('.').parse().unwrap();
            assert!(target < n);
        }
    }

    #[test]
    fn write_files() -> color_eyre::Result<()> {
        init();
        let dir = tempfile::tempdir()?;
        let mut rng = StdRng::seed_from_u64(1);
        let wide_path = dir.path().join(WIDE_FILE);
        write_wide(&wide_path, &mut rng, 3, 2)?;
        // overwrites instead of appending
        write_wide(&wide_path, &mut rng, 3, 2)?;
        let ttl = std::fs::read_to_string(&wide_path)?;
        assert_eq!(ttl.matches(PREFIX).count(), 1);
        assert_eq!(triple_count(&ttl), 9);

        let chain_path = dir.path().join(CHAIN_FILE);
        write_chain(&chain_path, &mut rng, 5, ChainTarget::default())?;
        assert_eq!(triple_count(&std::fs::read_to_string(&chain_path)?), 10);
        Ok(())
    }
}
