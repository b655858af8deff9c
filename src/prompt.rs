/// Prompt text sent to the model
use crate::palette::PALETTE;
use crate::tab_data::TabSnapshot;

/// System instruction for the on-device model session
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that organizes browser tabs into logical groups.";

/// Build the classification prompt for a list of ungrouped tabs.
///
/// Group names are requested in the language of `locale`.
pub fn build_prompt(tabs: &[TabSnapshot], locale: &str) -> String {
    let tab_list = tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            format!(
                "{}. ID: {}\n   Title: {}\n   URL: {}",
                i + 1,
                tab.id,
                tab.title,
                tab.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let colors = PALETTE
        .iter()
        .map(|color| color.name())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        r#"Analyze the following browser tabs and group them by theme. Provide a concise group name for each group.
Determine the language of the tab group names based on this locale code: {locale}

Tab list:
{tab_list}

Return the result in JSON format as follows:
{{
  "groups": [
    {{
      "name": "Group Name",
      "tabIds": [Array of tab ID numbers, e.g.: [123, 456, 789]],
      "color": "Color ({colors})"
    }}
  ]
}}

Important notes:
1. tabIds must use the actual ID numbers from the list above
2. Each tab can only belong to one group
3. Group by theme reasonably (e.g.: Shopping, News, Development, Entertainment, etc.)
4. Group names should be concise (2-4 words)
5. Choose appropriate colors to distinguish different themes
6. Return only JSON, no other text

Example: If there are shopping sites with IDs 123 and 456, return:
{{
  "groups": [
    {{
      "name": "Shopping",
      "tabIds": [123, 456],
      "color": "red"
    }}
  ]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs() -> Vec<TabSnapshot> {
        vec![
            TabSnapshot::new(123, "Cart", "https://shop.example.com/cart", 1, -1),
            TabSnapshot::new(456, "Docs", "https://doc.rust-lang.org", 1, -1),
        ]
    }

    #[test]
    fn test_prompt_lists_tabs_with_ids() {
        let prompt = build_prompt(&tabs(), "en-US");

        assert!(prompt.contains("1. ID: 123\n   Title: Cart\n   URL: https://shop.example.com/cart"));
        assert!(prompt.contains("\n\n2. ID: 456\n   Title: Docs"));
    }

    #[test]
    fn test_prompt_mentions_locale_and_palette() {
        let prompt = build_prompt(&tabs(), "zh-CN");

        assert!(prompt.contains("locale code: zh-CN"));
        assert!(prompt.contains("grey/blue/red/yellow/green/pink/purple/cyan/orange"));
        assert!(prompt.contains("Return only JSON"));
    }

    #[test]
    fn test_prompt_example_is_valid_schema() {
        let prompt = build_prompt(&tabs(), "en-US");
        let example_start = prompt.rfind("return:\n").unwrap() + "return:\n".len();

        let groups = crate::parser::parse_groups(&prompt[example_start..]).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Shopping");
    }
}
