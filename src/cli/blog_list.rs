//! Listing of previously generated blogs.

use std::error::Error;

use serde_json::Value;

use crate::core::chat_stream::BlogService;
use crate::core::config::Config;

pub async fn list_blogs(url: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let service = BlogService::new(
        reqwest::Client::new(),
        config.resolve_base_url(url.as_deref()),
    );

    let listing = service.list_blogs().await?;

    println!("📝 Generated blogs ({})", listing.count);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if listing.blogs.is_empty() {
        println!("No blogs generated yet.");
        return Ok(());
    }

    for blog in &listing.blogs {
        println!("  • {}", describe_blog(blog));
    }
    Ok(())
}

fn describe_blog(blog: &Value) -> String {
    match blog {
        Value::String(name) => name.clone(),
        Value::Object(fields) => {
            let title = ["topic", "title", "filename", "file_path"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .unwrap_or("(untitled)");
            match fields.get("generated_at").and_then(Value::as_str) {
                Some(generated_at) => format!("{title} ({generated_at})"),
                None => title.to_string(),
            }
        }
        other => other.to_string(),
    }
}
