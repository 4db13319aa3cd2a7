use std::path::{Path, PathBuf};

use tagjump::core::config::{Config, SearchConfig};
use tagjump::history::{Direction, LocationRef, NavigationHistory};
use tagjump::lookup::{FsHost, Lookup, Outcome};
use tagjump::tags::{Location, TagFileHeader, TagIndexSearch};
use tagjump::Error;
use tempfile::TempDir;

const SORTED: &str = "!_TAG_FILE_FORMAT\t2\t/extended format/\n!_TAG_FILE_SORTED\t1\t/0=unsorted, 1=sorted, 2=foldcase/\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn host_at(path: PathBuf) -> FsHost {
    FsHost::new(LocationRef::Position {
        path,
        offset: 0,
        line: 1,
    })
}

/// Deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

#[test]
fn test_line_number_record_jumps_and_records_history() {
    let temp = TempDir::new().unwrap();
    let mut source = String::new();
    for i in 1..=600 {
        source.push_str(&format!("/* line {} */\n", i));
    }
    let widget = write(temp.path(), "widget.c", &source);
    let main = write(temp.path(), "main.c", "int main(void)\n{\n}\n");
    let tags = write(
        temp.path(),
        "tags",
        &format!("{}setup_frame_gcs\twidget.c\t572;\"\tf\n", SORTED),
    );

    let mut lookup = Lookup::new(&Config::default());
    let mut host = host_at(main.clone());

    let outcome = lookup.find_tag(&mut host, "setup_frame_gcs", &[tags]).unwrap();
    let Outcome::SingleMatch { target } = outcome else {
        panic!("expected a single match");
    };
    assert_eq!(target.tag.record.location, Location::LineNumber(572));
    assert_eq!(target.arrival.to_string(), format!("{}:572", widget.display()));

    let history = lookup.history();
    let history = history.lock();
    let locations: Vec<String> = history.entries().map(|e| e.location.to_string()).collect();
    assert_eq!(
        locations,
        vec![format!("{}:1", main.display()), format!("{}:572", widget.display())]
    );
    assert_eq!(history.current().unwrap().key, 2);
}

#[test]
fn test_search_returns_record_verbatim() {
    let temp = TempDir::new().unwrap();
    let tags = write(
        temp.path(),
        "tags",
        &format!(
            "{}VALAMA\tsrc/m/v.h\t12;\"\td\nVALAMASK\tsrc/m/gec63.h\t59;\"\td\nVALAMASKS\tsrc/m/x.h\t3;\"\td\n",
            SORTED
        ),
    );

    let mut lookup = Lookup::new(&Config::default());
    let lines = lookup.search_lines("VALAMASK", &tags).unwrap();
    assert_eq!(lines, vec!["VALAMASK\tsrc/m/gec63.h\t59;\"\td".to_string()]);
}

#[test]
fn test_duplicate_names_give_multiple_matches_in_file_order() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.c", "int foo;\n");
    write(temp.path(), "b.c", "void foo(void)\n{\n}\n");
    let tags = write(
        temp.path(),
        "tags",
        &format!(
            "{}foo\ta.c\t/^int foo;$/;\"\tv\nfoo\tb.c\t/^void foo(void)$/;\"\tf\n",
            SORTED
        ),
    );

    let mut lookup = Lookup::new(&Config::default());
    let mut host = host_at(temp.path().join("a.c"));
    let outcome = lookup.find_tag(&mut host, "foo", &[tags]).unwrap();

    let Outcome::MultipleMatches { matches } = outcome else {
        panic!("expected multiple matches");
    };
    let files: Vec<&str> = matches.iter().map(|m| m.record.file_path.as_str()).collect();
    assert_eq!(files, vec!["a.c", "b.c"]);
    assert!(lookup.history().lock().is_empty());

    // Choosing one resolves it like a single match
    let target = lookup.resolve_and_navigate(&mut host, &matches[1]).unwrap();
    assert_eq!(target.arrival.to_string(), format!("{}:1", temp.path().join("b.c").display()));
    assert_eq!(lookup.history().lock().len(), 2);
}

#[test]
fn test_not_found_leaves_history_alone() {
    let temp = TempDir::new().unwrap();
    let tags = write(temp.path(), "tags", &format!("{}bar\tb.c\t1;\"\n", SORTED));

    let mut lookup = Lookup::new(&Config::default());
    let mut host = host_at(temp.path().join("b.c"));
    let outcome = lookup.find_tag(&mut host, "foo", &[tags]).unwrap();
    assert!(matches!(outcome, Outcome::NotFound { ref query } if query == "foo"));
    assert!(lookup.history().lock().is_empty());
}

#[test]
fn test_unsorted_index_is_refused() {
    let temp = TempDir::new().unwrap();
    let tags = write(
        temp.path(),
        "tags",
        "!_TAG_FILE_SORTED\t0\t/0=unsorted/\nzeta\tz.c\t1;\"\nalpha\ta.c\t1;\"\n",
    );

    let mut lookup = Lookup::new(&Config::default());
    let mut host = host_at(temp.path().join("a.c"));
    let result = lookup.find_tag(&mut host, "alpha", &[tags]);
    assert!(matches!(result, Err(Error::UnsortedIndex { .. })));
}

#[test]
fn test_search_agrees_with_brute_force() {
    let temp = TempDir::new().unwrap();
    let mut rng = Lcg(0x7a6);

    // Short names over a tiny alphabet give many duplicates and shared prefixes
    let alphabet = b"abcd_";
    let mut lines: Vec<String> = (0..1500)
        .map(|i| {
            let len = 1 + rng.below(4) as usize;
            let name: String = (0..len)
                .map(|_| alphabet[rng.below(alphabet.len() as u64) as usize] as char)
                .collect();
            format!("{}\tsrc/f{}.c\t{};\"\tf", name, i % 13, i + 1)
        })
        .collect();
    lines.sort();

    let mut content = String::from(SORTED);
    for line in &lines {
        content.push_str(line);
        content.push('\n');
    }
    let tags = write(temp.path(), "tags", &content);
    let header = TagFileHeader::parse(&tags).unwrap();

    let params = SearchConfig {
        block_size: 64,
        chunk_size: 32,
        max_chunk_size: 1024,
    };

    let mut queries: Vec<String> = lines
        .iter()
        .map(|l| l.split('\t').next().unwrap().to_string())
        .collect();
    queries.dedup();
    queries.extend(["0", "zzzz", "abcde", "_", "dd_x"].iter().map(|q| q.to_string()));

    for query in &queries {
        let expected: Vec<&String> = lines
            .iter()
            .filter(|l| l.split('\t').next() == Some(query.as_str()))
            .collect();
        let found = TagIndexSearch::new(&header, params).search(query, false).unwrap();
        let found: Vec<&String> = found.iter().collect();
        assert_eq!(found, expected, "query {:?}", query);
    }
}

#[test]
fn test_history_matches_reference_model() {
    let mut rng = Lcg(42);
    let mut history = NavigationHistory::new();
    // Keys recorded so far and the index of the current one
    let mut model: Vec<u64> = Vec::new();
    let mut current: Option<usize> = None;

    for step in 0..2000 {
        match rng.below(5) {
            0 | 1 => {
                let key = history.record(LocationRef::File {
                    path: PathBuf::from(format!("f{}.c", step)),
                });
                assert_eq!(key, model.last().copied().unwrap_or(0) + 1);
                model.push(key);
                current = Some(model.len() - 1);
            }
            2 => {
                let result = history.jump(Direction::Back).map(|e| e.key);
                match current {
                    None => assert!(matches!(result, Err(Error::HistoryEmpty))),
                    Some(0) => assert!(matches!(result, Err(Error::HistoryAtBeginning))),
                    Some(idx) => {
                        current = Some(idx - 1);
                        assert_eq!(result.unwrap(), model[idx - 1]);
                    }
                }
            }
            3 => {
                let result = history.jump(Direction::Forward).map(|e| e.key);
                match current {
                    None => assert!(matches!(result, Err(Error::HistoryEmpty))),
                    Some(idx) if idx + 1 == model.len() => {
                        assert!(matches!(result, Err(Error::HistoryAtEnd)))
                    }
                    Some(idx) => {
                        current = Some(idx + 1);
                        assert_eq!(result.unwrap(), model[idx + 1]);
                    }
                }
            }
            _ => {
                if rng.below(20) == 0 {
                    history.reset();
                    model.clear();
                    current = None;
                }
            }
        }

        assert_eq!(history.current().map(|e| e.key), current.map(|idx| model[idx]));
    }
}

#[test]
fn test_back_and_forward_through_real_jumps() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.c", "int alpha;\n");
    write(temp.path(), "b.c", "\nint beta;\n");
    let tags = write(
        temp.path(),
        "tags",
        &format!("{}alpha\ta.c\t/^int alpha;$/\nbeta\tb.c\t/^int beta;$/\n", SORTED),
    );
    let files = vec![tags];

    let mut lookup = Lookup::new(&Config::default());
    let mut host = host_at(temp.path().join("a.c"));

    lookup.find_tag(&mut host, "beta", &files).unwrap();
    lookup.find_tag(&mut host, "alpha", &files).unwrap();
    // a.c:1, b.c:2, b.c:2, a.c:1
    assert_eq!(lookup.history().lock().len(), 4);

    let back = lookup.history_back(&mut host).unwrap();
    assert_eq!(back.key, 3);
    assert_eq!(host.cursor().to_string(), format!("{}:2", temp.path().join("b.c").display()));

    lookup.history_back(&mut host).unwrap();
    lookup.history_back(&mut host).unwrap();
    assert!(matches!(lookup.history_back(&mut host), Err(Error::HistoryAtBeginning)));
    assert_eq!(lookup.history_current(&mut host).unwrap().key, 1);
    assert_eq!(lookup.history_forward(&mut host).unwrap().key, 2);
}
