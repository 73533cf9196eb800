//! CLI subcommands — validate, answer, run.

use clap::Subcommand;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::executor::Interpreter;
use crate::core::parser;
use crate::core::types::{Outcome, RawStep, RunStatus};
use crate::lexicon::Lexicon;
use crate::scene::{SceneFile, SceneGraph};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a program file without executing it
    Validate {
        /// Path to the program (JSON array of steps)
        #[arg(short, long)]
        program: PathBuf,
    },

    /// Answer one program against one scene
    Answer {
        /// Path to the scene JSON
        #[arg(short, long)]
        scene: PathBuf,

        /// Path to the program (JSON array of steps)
        #[arg(short, long)]
        program: PathBuf,

        /// Lexicon config (YAML); omitted → exact matching only
        #[arg(short, long)]
        lexicon: Option<PathBuf>,
    },

    /// Run a question file against a scene file, one JSON line per outcome
    Run {
        /// Path to the scenes JSON (image id → scene)
        #[arg(long)]
        scenes: PathBuf,

        /// Path to the questions JSON (question id → question)
        #[arg(long)]
        questions: PathBuf,

        /// Lexicon config (YAML); omitted → exact matching only
        #[arg(short, long)]
        lexicon: Option<PathBuf>,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Validate { program } => cmd_validate(&program),
        Commands::Answer {
            scene,
            program,
            lexicon,
        } => cmd_answer(&scene, &program, lexicon.as_deref()),
        Commands::Run {
            scenes,
            questions,
            lexicon,
        } => cmd_run(&scenes, &questions, lexicon.as_deref()),
    }
}

// ============================================================================
// Question files
// ============================================================================

/// One question as stored in a GQA-style question file.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(rename = "imageId")]
    pub image_id: String,

    #[serde(default)]
    pub question: Option<String>,

    /// The functional program.
    pub semantic: Vec<RawStep>,
}

/// Load a question file: question id → question, order-preserving.
pub fn load_questions(path: &Path) -> Result<IndexMap<String, Question>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("question parse error: {}", e))
}

/// Load a scene file: image id → scene, order-preserving.
pub fn load_scenes(path: &Path) -> Result<IndexMap<String, SceneFile>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("scene parse error: {}", e))
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon, String> {
    match path {
        Some(p) => Lexicon::load(p),
        None => Ok(Lexicon::default()),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_validate(program: &Path) -> Result<(), String> {
    let steps = parser::parse_program_file(program)?;
    let errors = parser::validate_program(&steps);

    if errors.is_empty() {
        println!("OK: {} steps", steps.len());
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

/// Load everything and run one program. Split out so tests can check the
/// outcome without capturing stdout.
pub fn answer_outcome(
    scene: &Path,
    program: &Path,
    lexicon: Option<&Path>,
) -> Result<Outcome, String> {
    let content = std::fs::read_to_string(scene)
        .map_err(|e| format!("failed to read {}: {}", scene.display(), e))?;
    let graph = SceneGraph::from_json(&content)?;
    let steps = parser::parse_program_file(program)?;
    let lexicon = load_lexicon(lexicon)?;
    Ok(Interpreter::new(&graph, &lexicon).run(&steps))
}

fn cmd_answer(scene: &Path, program: &Path, lexicon: Option<&Path>) -> Result<(), String> {
    let outcome = answer_outcome(scene, program, lexicon)?;
    let json = serde_json::to_string(&outcome).map_err(|e| format!("serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// One line of `run` output.
#[derive(Debug, Serialize)]
struct RunRecord<'a> {
    question_id: &'a str,
    image_id: &'a str,
    #[serde(flatten)]
    outcome: Outcome,
}

/// Status counts over a batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunTally {
    pub success: u32,
    pub skipped: u32,
    pub known_error: u32,
    pub unknown_error: u32,
}

impl RunTally {
    pub fn record(&mut self, status: RunStatus) {
        match status {
            RunStatus::Success => self.success += 1,
            RunStatus::Skipped => self.skipped += 1,
            RunStatus::KnownError => self.known_error += 1,
            RunStatus::UnknownError => self.unknown_error += 1,
        }
    }
}

fn cmd_run(scenes: &Path, questions: &Path, lexicon: Option<&Path>) -> Result<(), String> {
    let scenes = load_scenes(scenes)?;
    let questions = load_questions(questions)?;
    let lexicon = load_lexicon(lexicon)?;

    // Graphs build once per image, shared across that image's questions.
    let mut graphs: HashMap<&str, SceneGraph> = HashMap::new();
    let mut tally = RunTally::default();

    for (question_id, question) in &questions {
        let scene = scenes
            .get(&question.image_id)
            .ok_or_else(|| format!("question {} references unknown image {}", question_id, question.image_id))?;
        let graph = graphs
            .entry(question.image_id.as_str())
            .or_insert_with(|| SceneGraph::from_scene(scene));

        let outcome = Interpreter::new(graph, &lexicon).run(&question.semantic);
        info!(question = %question_id, status = %outcome.status, "answered");
        tally.record(outcome.status);

        let record = RunRecord {
            question_id,
            image_id: &question.image_id,
            outcome,
        };
        let json =
            serde_json::to_string(&record).map_err(|e| format!("serialize error: {}", e))?;
        println!("{}", json);
    }

    eprintln!(
        "{} questions: {} success, {} skipped, {} known errors, {} unknown errors",
        questions.len(),
        tally.success,
        tally.skipped,
        tally.known_error,
        tally.unknown_error
    );
    Ok(())
}
