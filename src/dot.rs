use std::{collections::HashMap, io::Write};

use crate::{history::History, term::Term};

impl History {
    /// Write graphviz dot file to the given writer.
    pub fn dot(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let mut ids: HashMap<&Term, usize> = HashMap::new();
        let mut nodes = vec![];
        for term in self.iter().flat_map(|rec| rec.operands().chain([&rec.result])) {
            if !ids.contains_key(term) {
                ids.insert(term, nodes.len());
                nodes.push(term);
            }
        }

        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for (id, term) in nodes.iter().enumerate() {
            let shape = if term.is_leaf() { "ellipse" } else { "box" };
            writeln!(
                writer,
                "a{} [label=\"{} \\ndata:{}\", shape={}];",
                id,
                escape(term.name()),
                term.value(),
                shape
            )?;
        }
        for rec in self {
            let dst = ids[&rec.result];
            // Derived operators do not exist as nodes of their own.
            let style = if rec.op.is_primitive() {
                ""
            } else {
                ", style=dashed"
            };
            for src in rec.operands() {
                writeln!(
                    writer,
                    "a{} -> a{} [label=\"{}\"{}];",
                    ids[src], dst, rec.op, style
                )?;
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[test]
fn test_dot() {
    let a = Term::new("a", 2.);
    let b = Term::new("b", 3.);
    let mut history = History::new();
    let ab = history.multiply(&a, &b);
    history.add(&ab, &a);

    let mut buf = vec![];
    history.dot(&mut buf).unwrap();
    let dot = String::from_utf8(buf).unwrap();
    assert!(dot.starts_with("digraph G {\nrankdir=\"LR\";\n"));
    assert!(dot.ends_with("}\n"));
    assert!(dot.contains("a0 [label=\"a \\ndata:2\", shape=ellipse];"));
    assert!(dot.contains("a1 [label=\"b \\ndata:3\", shape=ellipse];"));
    assert!(dot.contains("a2 -> a3 [label=\"add\"];"));
    assert!(dot.contains("a0 -> a3 [label=\"add\"];"));
    assert!(dot.contains("a0 -> a2 [label=\"mul\"];"));
    assert!(dot.contains("a1 -> a2 [label=\"mul\"];"));
    assert_eq!(dot.matches("->").count(), 4);
}

#[test]
fn test_dot_derived_edges() {
    let a = Term::new("a", 6.);
    let b = Term::new("b", 4.);
    let mut history = History::new();
    let q = history.divide(&a, &b);
    history.negate(&q);

    let mut buf = vec![];
    history.dot(&mut buf).unwrap();
    let dot = String::from_utf8(buf).unwrap();
    assert!(dot.contains("a0 -> a2 [label=\"div\", style=dashed];"));
    assert!(dot.contains("a1 -> a2 [label=\"div\", style=dashed];"));
    assert!(dot.contains("a2 -> a3 [label=\"neg\"];"));
    assert_eq!(dot.matches("style=dashed").count(), 2);
}

#[test]
fn test_escape() {
    assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
}
