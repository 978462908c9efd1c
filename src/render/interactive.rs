//! Interactive terminal session.
//!
//! A blocking read-eval-draw loop over any `BufRead`/`Write` pair. The
//! diagram is redrawn after every command that changes the view; the call
//! returns when the user quits or the input ends.

use std::io::{self, BufRead, Write};

use log::debug;

use super::ascii::{render_ascii, Viewport};
use super::scene::Scene;
use crate::graph::{summarize, GraphModel};

/// Fraction of the visible area moved by one pan command
const PAN_STEP: f64 = 0.2;

const HELP: &str = "\
Commands:
  +  / -          zoom in / out
  h  j  k  l      pan left / down / up / right
  info <id>       show a node's kind, attributes and neighbors
  stats           show a structural summary
  reset           restore the initial view
  help            show this help
  q  / quit       close the view
";

/// A parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    Pan { fx: f64, fy: f64 },
    Info(String),
    Stats,
    Reset,
    Help,
    Redraw,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "" => Command::Redraw,
            "+" | "zoom-in" => Command::ZoomIn,
            "-" | "zoom-out" => Command::ZoomOut,
            "h" => Command::Pan { fx: -PAN_STEP, fy: 0.0 },
            "l" => Command::Pan { fx: PAN_STEP, fy: 0.0 },
            "k" => Command::Pan { fx: 0.0, fy: -PAN_STEP },
            "j" => Command::Pan { fx: 0.0, fy: PAN_STEP },
            "info" | "i" if !rest.is_empty() => Command::Info(rest.to_string()),
            "stats" | "s" => Command::Stats,
            "reset" | "r" => Command::Reset,
            "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to close the view
    Quit,
    /// Input reached end of file
    Closed,
}

pub struct InteractiveSession<'a> {
    scene: &'a Scene,
    graph: &'a GraphModel,
    viewport: Viewport,
    columns: usize,
    rows: usize,
}

impl<'a> InteractiveSession<'a> {
    pub fn new(scene: &'a Scene, graph: &'a GraphModel, columns: usize, rows: usize) -> Self {
        Self {
            scene,
            graph,
            viewport: Viewport::default(),
            columns,
            rows,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Run until the user quits or `input` is exhausted
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> io::Result<SessionEnd> {
        writeln!(
            output,
            "Topology view: {} nodes, {} links. Type 'help' for commands.",
            self.graph.node_count(),
            self.graph.link_count()
        )?;
        self.draw(&mut output)?;

        let mut line = String::new();
        loop {
            write!(output, "tgraph> ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(SessionEnd::Closed);
            }

            let command = Command::parse(&line);
            debug!("Interactive command: {:?}", command);

            match command {
                Command::Quit => return Ok(SessionEnd::Quit),
                Command::ZoomIn => {
                    self.viewport.zoom_in();
                    self.draw(&mut output)?;
                }
                Command::ZoomOut => {
                    self.viewport.zoom_out();
                    self.draw(&mut output)?;
                }
                Command::Pan { fx, fy } => {
                    self.viewport.pan_by(self.scene, fx, fy);
                    self.draw(&mut output)?;
                }
                Command::Reset => {
                    self.viewport.reset();
                    self.draw(&mut output)?;
                }
                Command::Redraw => self.draw(&mut output)?,
                Command::Info(id) => self.info(&id, &mut output)?,
                Command::Stats => write!(output, "{}", summarize(self.graph).report())?,
                Command::Help => write!(output, "{}", HELP)?,
                Command::Unknown(text) => writeln!(
                    output,
                    "Unknown command '{}'. Type 'help' for commands.",
                    text
                )?,
            }
        }
    }

    fn draw<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let canvas = render_ascii(self.scene, &self.viewport, self.columns, self.rows);
        write!(output, "{}", canvas)?;
        writeln!(output, "zoom {:.2}x", self.viewport.zoom)
    }

    fn info<W: Write>(&self, id: &str, output: &mut W) -> io::Result<()> {
        let Some(node) = self.graph.node(id) else {
            return writeln!(output, "No node '{}'", id);
        };

        writeln!(output, "{} [{}] \"{}\"", node.id, node.kind, node.display_label())?;
        for (key, value) in &node.attributes {
            writeln!(output, "  {}: {}", key, value)?;
        }
        let neighbors: Vec<&str> = self
            .graph
            .neighbors(id)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if neighbors.is_empty() {
            writeln!(output, "  neighbors: none")
        } else {
            writeln!(output, "  neighbors: {}", neighbors.join(", "))
        }
    }
}
