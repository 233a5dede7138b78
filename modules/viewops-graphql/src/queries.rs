//! GraphQL documents understood by the operational database.
//!
//! `search_batch_notes` is a tracked SQL function on the engine side; the
//! application never ranks vectors itself.

pub const BATCH_FRAGMENT: &str = r#"
fragment BatchFragment on batches {
    id
    batch_number
    scheme
    kill_date
    cost_per_kg
    cold_weight_kg
    yield_percentage
}
"#;

const GET_BATCH_BY_NUMBER_OPERATION: &str = r#"
query GetBatchByNumber($batch_number: Int!) {
    batches(where: { batch_number: { _eq: $batch_number } }) {
        ...BatchFragment
    }
}
"#;

pub const GET_WEIGHT_BY_SCHEME: &str = r#"
query GetWeightByScheme($scheme: String!) {
    batches_aggregate(where: { scheme: { _ilike: $scheme } }) {
        aggregate {
            sum {
                cold_weight_kg
            }
            count
        }
    }
}
"#;

const SEARCH_NOTES_OPERATION: &str = r#"
query SearchNotes($query_vector: vector!, $match_threshold: String!, $match_count: Int!) {
    search_batch_notes(
        args: {
            query_vector: $query_vector
            match_threshold: $match_threshold
            match_count: $match_count
        }
    ) {
        note_content
        batch {
            ...BatchFragment
        }
    }
}
"#;

pub const INSERT_BATCH_NOTE: &str = r#"
mutation InsertBatchNote($batch_id: uuid!, $content: String!, $embedding: vector!) {
    insert_batch_notes_one(
        object: { batch_id: $batch_id, note_content: $content, embedding: $embedding }
    ) {
        id
    }
}
"#;

/// Exact lookup by human-readable batch number, with the batch fragment attached.
pub fn get_batch_by_number() -> String {
    with_batch_fragment(GET_BATCH_BY_NUMBER_OPERATION)
}

/// Similarity search over operational notes, with the batch fragment attached.
pub fn search_notes() -> String {
    with_batch_fragment(SEARCH_NOTES_OPERATION)
}

fn with_batch_fragment(operation: &str) -> String {
    format!("{operation}{BATCH_FRAGMENT}")
}

/// Name of the first operation in a document (`query Foo` / `mutation Foo`), for logs.
pub fn operation_name(document: &str) -> Option<&str> {
    let mut words = document.split_whitespace();
    while let Some(word) = words.next() {
        if word == "query" || word == "mutation" {
            return words
                .next()
                .map(|name| name.split(['(', '{']).next().unwrap_or(name))
                .filter(|name| !name.is_empty());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_attached_to_batch_queries() {
        for document in [get_batch_by_number(), search_notes()] {
            assert!(document.contains("...BatchFragment"));
            assert!(document.contains("fragment BatchFragment on batches"));
        }
    }

    #[test]
    fn weight_query_needs_no_fragment() {
        assert!(!GET_WEIGHT_BY_SCHEME.contains("BatchFragment"));
        assert!(GET_WEIGHT_BY_SCHEME.contains("_ilike: $scheme"));
    }

    #[test]
    fn search_passes_threshold_as_string() {
        assert!(search_notes().contains("$match_threshold: String!"));
        assert!(search_notes().contains("$match_count: Int!"));
    }

    #[test]
    fn operation_names() {
        assert_eq!(operation_name(&get_batch_by_number()), Some("GetBatchByNumber"));
        assert_eq!(operation_name(GET_WEIGHT_BY_SCHEME), Some("GetWeightByScheme"));
        assert_eq!(operation_name(&search_notes()), Some("SearchNotes"));
        assert_eq!(operation_name(INSERT_BATCH_NOTE), Some("InsertBatchNote"));
        assert_eq!(operation_name("{ batches { id } }"), None);
    }
}
