use adreset::admin::{DEFAULT_PAGE_SIZE, QuestionPager};
use adreset::model::SecretQuestion;
use adreset::paginate::PaginatedAggregator;

use super::*;

pub(super) async fn handle_questions_command(command: QuestionsCommands) -> Result<()> {
    let (_, portal) = discover_portal()?;

    match command {
        QuestionsCommands::List {
            page,
            per_page,
            all,
            json,
        } => {
            require_route(&portal, Route::ConfigureQuestions { page: page.max(1) })?;
            let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE);
            if all {
                let aggregator = PaginatedAggregator::new(per_page)
                    .with_max_in_flight(portal.config().max_in_flight_pages);
                let questions = portal.client().all_questions(&aggregator, None).await?;
                print_questions(&questions, json)?;
            } else {
                let pager = QuestionPager::with_page_size(portal.client().clone(), per_page);
                pager.load(page).await?;
                let view = pager.view();
                print_questions(&view.questions, json)?;
                if !json {
                    println!("page {} of {}", view.page, view.pages.max(1));
                }
            }
        }
        QuestionsCommands::Add { text } => {
            require_route(&portal, Route::ConfigureQuestions { page: 1 })?;
            let pager = portal.question_pager();
            let added = pager.add_question(&text).await?;
            println!("Added question {}", added.id);
        }
        QuestionsCommands::Enable { id } => set_enabled(&portal, id, true).await?,
        QuestionsCommands::Disable { id } => set_enabled(&portal, id, false).await?,
        QuestionsCommands::Edit { id, text } => {
            let pager = pager_with(&portal, id).await?;
            pager.edit_text(id, &text).await?;
            println!("Updated question {}", id);
        }
    }

    Ok(())
}

async fn set_enabled(portal: &Portal, id: i64, enabled: bool) -> Result<()> {
    let pager = pager_with(portal, id).await?;
    pager.set_enabled(id, enabled).await?;
    print_notices(pager.take_notices());
    Ok(())
}

/// A pager positioned on the page that holds question `id`.
async fn pager_with(portal: &Portal, id: i64) -> Result<QuestionPager> {
    require_route(portal, Route::ConfigureQuestions { page: 1 })?;
    let pager = portal.question_pager();
    let mut page = 1;
    loop {
        pager.load(page).await?;
        let view = pager.view();
        if view.questions.iter().any(|q| q.id == id) {
            return Ok(pager);
        }
        if page >= view.pages {
            anyhow::bail!("no question with the ID {}", id);
        }
        page += 1;
    }
}

fn print_questions(questions: &[SecretQuestion], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(questions).context("serialize questions json")?
        );
        return Ok(());
    }
    for q in questions {
        let state = if q.enabled { "enabled" } else { "disabled" };
        println!("{}\t{}\t{}", q.id, state, q.text);
    }
    Ok(())
}
