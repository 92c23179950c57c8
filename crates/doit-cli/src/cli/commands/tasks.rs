//! Task command handlers.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use doit_core::api::{Category, TaskDraft};
use doit_core::tasks::TaskStore;

use super::{api_client, ensure_session};

pub async fn list(category: Option<&str>) -> Result<()> {
    let category = category
        .map(|raw| raw.parse::<Category>().map_err(anyhow::Error::msg))
        .transpose()?;

    let api = api_client()?;
    ensure_session(&api).await?;

    let store = TaskStore::new(api);
    store.load_all().await?;

    let tasks = match category {
        Some(category) => {
            store.set_selected_category(category);
            store.filtered_tasks()
        }
        None => store.tasks(),
    };

    if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        for task in tasks {
            let marker = if task.completed { "x" } else { " " };
            println!(
                "[{marker}] {}  {}  {}  {}",
                task.id,
                task.title,
                task.category,
                task.time.to_rfc3339()
            );
        }
    }
    Ok(())
}

pub async fn add(title: &str, category: &str, time: Option<&str>) -> Result<()> {
    let category: Category = category.parse().map_err(anyhow::Error::msg)?;
    let time = match time {
        Some(raw) => parse_time(raw)?,
        None => Utc::now(),
    };

    let api = api_client()?;
    ensure_session(&api).await?;

    let store = TaskStore::new(api);
    let task = store
        .create(TaskDraft {
            title: title.to_string(),
            category,
            time,
        })
        .await?;
    println!("Created task {}", task.id);
    Ok(())
}

pub async fn set_completion(id: &str, completed: bool) -> Result<()> {
    let api = api_client()?;
    ensure_session(&api).await?;

    let store = TaskStore::new(api);
    store.load_all().await?;

    let settle = store.set_completion(id, completed);
    settle.await.context("completion update aborted")??;

    let state = if completed { "done" } else { "not done" };
    println!("Marked {id} as {state}");
    Ok(())
}

/// Accepts RFC 3339, or the web form's datetime-local shape
/// (`YYYY-MM-DDTHH:MM`, interpreted as local time).
fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("Invalid time '{raw}': expected RFC 3339 or YYYY-MM-DDTHH:MM"))?;
    let local = naive
        .and_local_timezone(Local)
        .single()
        .with_context(|| format!("Ambiguous local time '{raw}'"))?;
    Ok(local.with_timezone(&Utc))
}
