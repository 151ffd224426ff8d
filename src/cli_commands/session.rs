use clap::Args;

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) username: String,
    /// Falls back to ADRESET_PASSWORD
    #[arg(long)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct WhoamiArgs {
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct RecoverArgs {
    #[arg(long)]
    pub(crate) username: String,
    /// Answer as QUESTION_ID=TEXT; repeat for every configured question
    #[arg(long = "answer", value_name = "ID=TEXT")]
    pub(crate) answers: Vec<String>,
    /// Falls back to ADRESET_NEW_PASSWORD
    #[arg(long)]
    pub(crate) new_password: Option<String>,
    /// Must match --new-password when given
    #[arg(long)]
    pub(crate) confirm_password: Option<String>,
    /// Only list the questions to answer
    #[arg(long)]
    pub(crate) list: bool,
}
