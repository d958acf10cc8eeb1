//! Registered topics

use crate::Result;
use skillswap_core::Topic;
use skillswap_store::{RemoteStore, StorePath};

pub use skillswap_session::register_topics;

pub async fn list_topics(store: &dyn RemoteStore) -> Result<Vec<Topic>> {
    let value = store.get(&StorePath::topics()).await?;
    Ok(Topic::list_from_value(value.as_ref()))
}

/// Topics whose name contains `search`, ignoring case; all of them when the
/// search is blank
pub fn search<'a>(topics: &'a [Topic], search: &str) -> Vec<&'a Topic> {
    topics.iter().filter(|t| t.matches(search)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_ignores_case() {
        let topics = vec![Topic::new("Guitar"), Topic::new("Go"), Topic::new("Cooking")];
        let names: Vec<&str> = search(&topics, "  gO ").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Go"]);
        assert_eq!(search(&topics, "").len(), 3);
    }
}
