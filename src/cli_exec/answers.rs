use adreset::workflow::{AnswerConfigurationWorkflow, Phase};

use super::*;

pub(super) async fn handle_answers_command(command: AnswersCommands) -> Result<()> {
    let (_, portal) = discover_portal()?;
    require_route(&portal, Route::SetAnswers)?;
    let about = portal.about().await?;
    let mut workflow = portal.answer_workflow(about);
    let client = portal.client();
    workflow.initialize(client).await?;

    match command {
        AnswersCommands::Show { json } => {
            print_notices(workflow.take_notices());
            show(&workflow, json)?;
        }
        AnswersCommands::Set { answers } => {
            workflow.take_notices();
            if workflow.phase() == Phase::Configured {
                anyhow::bail!(
                    "Your answers are already set (run `adreset answers reset` to change them)"
                );
            }
            let required = workflow.slots().len();
            if answers.len() != required {
                anyhow::bail!(
                    "{} answers were supplied but {} are required",
                    answers.len(),
                    required
                );
            }
            for (slot, raw) in answers.iter().enumerate() {
                let answer = parse_answer(raw)?;
                workflow.select(slot, answer.question_id)?;
                workflow.set_answer(slot, &answer.answer)?;
            }
            let result = workflow.submit(client).await;
            print_notices(workflow.take_notices());
            result?;
        }
        AnswersCommands::Reset => {
            workflow.take_notices();
            let result = workflow.reset(client).await;
            print_notices(workflow.take_notices());
            result?;
        }
    }

    Ok(())
}

fn show(workflow: &AnswerConfigurationWorkflow, json: bool) -> Result<()> {
    let configured = workflow.phase() == Phase::Configured;
    if json {
        let value = serde_json::json!({
            "configured": configured,
            "required_answers": workflow.about().required_answers,
            "questions": workflow.questions(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("serialize answers json")?
        );
        return Ok(());
    }

    if configured {
        for (i, q) in workflow.questions().iter().enumerate() {
            println!("{}. [{}] {}", i + 1, q.id, q.text);
        }
    } else {
        println!(
            "No answers set; choose {} of these questions:",
            workflow.about().required_answers
        );
        for q in workflow.questions() {
            println!("[{}] {}", q.id, q.text);
        }
    }
    Ok(())
}
