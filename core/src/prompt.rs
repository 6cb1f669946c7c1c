use chrono::{DateTime, SecondsFormat, Utc};

use crate::registry::Catalog;

const PLATFORM_HINTS: &str = r##"* Google Docs & Sheets:
    * ID for Updates: Updating existing documents/sheets REQUIRES an "ID", not just a name.
    * Two-Step Creation & Population:
        1. Create: First, call the function to create the blank document/sheet. Get the title from the user and confirm before this step.
        2. Update/Append: Once creation is confirmed and the ID is available, use a *separate* function call to add/insert content using that ID.
        * NEVER attempt to insert content during the initial creation call.
        * If a document/sheet is confirmed as already created (and its ID is known), proceed directly to content insertion or other modification actions.
    * Google Docs Update Specifics: Ensure 'location' and 'index' parameters are correctly passed for updates to avoid failures. Pass location index 1 the first time after creation.
* Slack:
    * '#channelName' can be used as both channel ID and name. Pass it as the ID if provided in this format.
    * For sending messages: If the user provides names for recipients, use a helper function (if available) to retrieve their Slack user IDs. If multiple matches occur for a name, ask the user to clarify. Send the message using the retrieved IDs.
    * Slack Example, use blocks if needed with the correct format => {
        "channel": "#channelName or use the channel ID",
        "text": "Hello, team! This is a message from the Fastn agent.",
        "blocks": []
      }
* Google Calendar:
    * Creating meetings requires a title and a date. Start time, end time and zone should be US. Make sure you pass the times and do not miss any parameters.
* Google Sheets:
    * In the body only pass the title of the sheet. Do not pass any other parameters.
    * Example => {
        "properties": {
          "title": "ask user to provide a title for the sheet or use a default title from context"
        }
      }"##;

/// Renders the system message for one run.
pub fn system_instructions(catalog: &Catalog, now: DateTime<Utc>) -> String {
    // Pretty printing a Value cannot fail.
    let tools = serde_json::to_string_pretty(&catalog.summary()).unwrap_or_default();

    format!(
        "You are an assistant that can use Fastn.ai tools to fulfill user requests.\n\
         Here are the available Fastn.ai tools: {tools}\n\
         \n\
         Based on the user's query, decide which Fastn.ai tool to call and with what parameters.\n\
         If no tool is suitable, respond with a message to the user.\n\
         \n\
         {hints}\n\
         * Current Date: {now}\n",
        tools = tools,
        hints = PLATFORM_HINTS,
        now = now.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

pub fn user_message(query: &str) -> String {
    format!("User's request: {}", query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolDescriptor;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn instructions_embed_catalog_and_timestamp() {
        let catalog = Catalog::new(vec![ToolDescriptor {
            name: "createDoc".into(),
            description: "Create a Google Doc".into(),
            parameters: json!({ "type": "object" }),
            action_id: "secret-action".into(),
        }]);
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();

        let text = system_instructions(&catalog, now);
        assert!(text.contains("\"name\": \"createDoc\""));
        assert!(text.contains("Create a Google Doc"));
        assert!(!text.contains("secret-action"));
        assert!(text.contains("* Current Date: 2025-03-04T05:06:07.000Z"));
        assert!(text.contains("Two-Step Creation"));
    }

    #[test]
    fn empty_catalog_still_renders() {
        let text = system_instructions(&Catalog::default(), Utc::now());
        assert!(text.contains("available Fastn.ai tools: []"));
    }

    #[test]
    fn hints_survive_embedded_quotes_and_hashes() {
        let text = system_instructions(&Catalog::default(), Utc::now());
        assert!(text.contains(r##""channel": "#channelName or use the channel ID""##));
        assert!(text.contains("* Google Calendar:"));
        assert!(text.contains("ask user to provide a title for the sheet"));
    }

    #[test]
    fn user_message_prefix() {
        assert_eq!(user_message("make a doc"), "User's request: make a doc");
    }
}
