use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum QuestionsCommands {
    /// List one page of questions, or all of them
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        per_page: Option<u32>,
        /// Fetch every page
        #[arg(long)]
        all: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a secret question
    Add { text: String },

    /// Enable a question
    Enable { id: i64 },

    /// Disable a question (existing answers keep it)
    Disable { id: i64 },

    /// Change a question's text
    Edit { id: i64, text: String },
}

#[derive(Subcommand)]
pub(crate) enum AnswersCommands {
    /// Show configured questions, or the catalog to choose from
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Set every answer at once
    Set {
        /// Answer as QUESTION_ID=TEXT; one per required answer
        #[arg(long = "answer", value_name = "ID=TEXT", required = true)]
        answers: Vec<String>,
    },

    /// Delete your answers so they can be set again
    Reset,
}
