/// Content catalog with file support.
///
/// ## Sources (priority order):
///   1. Catalog file named in `config.toml` (`[general] catalog = "..."`)
///   2. Built-in modules
///
/// ## Catalog file format (TOML):
///   ```toml
///   [[modules]]
///   title = "Variables and Data Types"
///   description = "..."
///   introduction = "..."
///   example_code = ["int age = 25;"]
///   stars_required = 0
///
///   [[modules.activities]]
///   question = "What type of variable would you use to store someone's age?"
///   kind = "multiple_choice"        # fill_in_the_blank | matching | code_analysis
///   options = ["int", "float", "string", "bool"]
///   correct_answer = "int"
///   hints = ["Think about whole numbers"]
///   ```
///
/// Files are validated after parsing; the built-in catalog is valid by
/// construction.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::activity::{Activity, ActivityKind};
use crate::domain::module::Module;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog has no modules")]
    Empty,

    #[error("module {module:?} has no activities")]
    NoActivities { module: String },

    #[error("module {module:?}, activity {activity}: {reason}")]
    InvalidActivity {
        module: String,
        activity: usize,
        reason: &'static str,
    },
}

/// Ordered, read-only list of modules.
#[derive(Clone, Debug)]
pub struct Catalog {
    modules: Vec<Module>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    modules: Vec<Module>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Catalog { modules: load_catalog() }
    }

    /// Validate and wrap a module list.
    pub fn from_modules(modules: Vec<Module>) -> Result<Self, CatalogError> {
        validate(&modules)?;
        Ok(Catalog { modules })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::from_modules(file.modules)
    }

    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn get(&self, idx: usize) -> Option<&Module> {
        self.modules.get(idx)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn validate(modules: &[Module]) -> Result<(), CatalogError> {
    if modules.is_empty() {
        return Err(CatalogError::Empty);
    }
    for m in modules {
        if m.activities.is_empty() {
            return Err(CatalogError::NoActivities { module: m.title.clone() });
        }
        for (i, a) in m.activities.iter().enumerate() {
            let reason = if a.correct_answer.trim().is_empty() {
                Some("empty correct answer")
            } else if a.kind.takes_options() && a.options.is_empty() {
                Some("kind requires options")
            } else if !a.kind.takes_options() && !a.options.is_empty() {
                Some("kind does not take options")
            } else if a.kind == ActivityKind::MultipleChoice
                && !a.options.iter().any(|o| a.accepts(o))
            {
                Some("correct answer is not an option")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(CatalogError::InvalidActivity {
                    module: m.title.clone(),
                    activity: i,
                    reason,
                });
            }
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Built-in modules
// ══════════════════════════════════════════════════════════════

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in modules, in navigation order. Same list on every call.
pub fn load_catalog() -> Vec<Module> {
    vec![
        Module {
            title: "Variables and Data Types".into(),
            description: "Learn about different types of variables in C#".into(),
            introduction: "Variables are containers for storing data values. \
                           Let's learn about the different types!"
                .into(),
            example_code: strings(&[
                "int age = 25;",
                "float height = 1.75f;",
                "string name = \"John\";",
                "bool isStudent = true;",
            ]),
            activities: vec![
                Activity {
                    question: "What type of variable would you use to store someone's age?".into(),
                    kind: ActivityKind::MultipleChoice,
                    options: strings(&["int", "float", "string", "bool"]),
                    correct_answer: "int".into(),
                    hints: strings(&["Think about whole numbers", "Age is always a whole number"]),
                },
                Activity {
                    question: "Complete the code: string name = \"___\";".into(),
                    kind: ActivityKind::FillInTheBlank,
                    options: vec![],
                    correct_answer: "John".into(),
                    hints: strings(&["Try a common name", "The name should be in quotes"]),
                },
            ],
            stars_required: 0,
        },
        Module {
            title: "Control Flow".into(),
            description: "Learn about if statements and loops".into(),
            introduction: "Control flow helps your program make decisions and repeat actions.".into(),
            example_code: strings(&[
                "int age = 18;",
                "if (age >= 18) {",
                "    Console.WriteLine(\"You are an adult\");",
                "} else {",
                "    Console.WriteLine(\"You are a minor\");",
                "}",
            ]),
            activities: vec![Activity {
                question: "Which operator checks if two values are equal?".into(),
                kind: ActivityKind::MultipleChoice,
                options: strings(&["=", "==", "!=", ">"]),
                correct_answer: "==".into(),
                hints: strings(&["It's two symbols", "Not the assignment operator"]),
            }],
            stars_required: 2,
        },
    ]
}
