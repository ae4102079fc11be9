//! List-query pipeline: filter, search, sort, paginate, in that order.
//!
//! Each stage validates its own parameters; the first failure aborts the
//! pipeline and no partial result is returned.

use crate::error::{ApiError, ApiResult};
use crate::types::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Raw query parameters for `GET /tasks`.
///
/// Fields stay strings here; the pipeline owns their validation so that
/// error messages are uniform regardless of how the value was supplied.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListParams {
    pub done: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Result envelope for a list query.
///
/// `total` counts the filtered set before pagination; `count` the returned
/// slice. Without a `limit` the two are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPage {
    pub total: usize,
    pub count: usize,
    pub page: i64,
    pub data: Vec<Task>,
}

/// Fields a task list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    Id,
    Title,
    Done,
    CreatedAt,
}

/// Valid `sort` values, as listed in the error message.
const SORT_FIELDS: &str = "id, title, done, createdAt";

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "done" => Some(SortField::Done),
            "createdAt" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    /// Natural-order comparison on the selected field.
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Done => a.done.cmp(&b.done),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

/// Run the full pipeline over the loaded collection.
pub fn run(params: &ListParams, mut tasks: Vec<Task>) -> ApiResult<TaskPage> {
    // Stage 1: filter by completion flag.
    if let Some(done) = params.done.as_deref() {
        let done = match done {
            "true" => true,
            "false" => false,
            _ => return Err(ApiError::validation("done must be 'true' or 'false'")),
        };
        tasks.retain(|t| t.done == done);
    }

    // Stage 2: case-folded substring search on title.
    if let Some(search) = params.search.as_deref()
        && !search.is_empty()
    {
        let keyword = search.to_lowercase();
        tasks.retain(|t| t.title.to_lowercase().contains(&keyword));
    }

    // Stage 3: sort. `asc` is the only ascending spelling; anything else
    // reverses the comparison.
    if let Some(sort) = params.sort.as_deref() {
        let field = SortField::parse(sort).ok_or_else(|| {
            ApiError::validation(format!("Invalid sort field. Use one of: {SORT_FIELDS}"))
        })?;
        let ascending = matches!(params.order.as_deref(), None | Some("asc"));
        // Vec::sort_by is stable, so ties keep their pre-sort order.
        tasks.sort_by(|a, b| {
            let ord = field.compare(a, b);
            if ascending { ord } else { ord.reverse() }
        });
    }

    // Stage 4: paginate. Out-of-range pages are an empty slice, not an error.
    let total = tasks.len();
    let page = resolve_page(params.page.as_deref());
    let data = match params.limit.as_deref() {
        Some(limit) => {
            let limit: i64 = limit
                .parse()
                .ok()
                .filter(|l| *l > 0)
                .ok_or_else(|| ApiError::validation("limit must be a positive number"))?;
            if page <= 0 {
                return Err(ApiError::validation("page must be positive"));
            }
            let start = ((page - 1) * limit) as usize;
            let end = (start + limit as usize).min(total);
            if start < total {
                tasks[start..end].to_vec()
            } else {
                Vec::new()
            }
        }
        None => tasks,
    };

    Ok(TaskPage {
        total,
        count: data.len(),
        page,
        data,
    })
}

/// Parse the requested page, defaulting to 1 when absent or unparseable.
/// Positivity is only enforced when pagination actually applies.
fn resolve_page(page: Option<&str>) -> i64 {
    page.and_then(|p| p.parse().ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, title: &str, done: bool, created_at: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            done,
            created_at: created_at.to_string(),
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task(1, "Read docs", false, "2026-08-06T08:01:00.000Z"),
            task(2, "Write API", true, "2026-08-06T08:02:00.000Z"),
            task(3, "Test coverage", false, "2026-08-06T08:03:00.000Z"),
            task(4, "Fix bug", true, "2026-08-06T08:04:00.000Z"),
            task(5, "Deploy project", false, "2026-08-06T08:05:00.000Z"),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut p = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "done" => p.done = value,
                "search" => p.search = value,
                "sort" => p.sort = value,
                "order" => p.order = value,
                "limit" => p.limit = value,
                "page" => p.page = value,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn no_params_returns_everything_in_insertion_order() {
        let page = run(&ListParams::default(), sample()).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.count, 5);
        assert_eq!(page.page, 1);
        assert_eq!(
            page.data.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn filters_by_done() {
        let page = run(&params(&[("done", "true")]), sample()).unwrap();
        assert!(page.data.iter().all(|t| t.done));
        assert_eq!(page.total, 2);

        let page = run(&params(&[("done", "false")]), sample()).unwrap();
        assert!(page.data.iter().all(|t| !t.done));
        assert_eq!(page.total, 3);
    }

    #[test]
    fn rejects_non_boolean_done() {
        let err = run(&params(&[("done", "maybe")]), sample()).unwrap_err();
        assert_eq!(err.to_string(), "done must be 'true' or 'false'");
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let page = run(&params(&[("search", "DOC")]), sample()).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Read docs");
    }

    #[test]
    fn empty_search_is_skipped() {
        let page = run(&params(&[("search", "")]), sample()).unwrap();
        assert_eq!(page.total, 5);
    }

    #[test]
    fn search_applies_after_done_filter() {
        // "e" appears in every title; only done=true survive the filter.
        let page = run(&params(&[("done", "true"), ("search", "e")]), sample()).unwrap();
        assert_eq!(page.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn sorts_by_id_title_done_and_created_at() {
        let by_title = run(&params(&[("sort", "title")]), sample()).unwrap();
        assert_eq!(by_title.data[0].title, "Deploy project");

        let by_created = run(&params(&[("sort", "createdAt"), ("order", "desc")]), sample())
            .unwrap();
        assert_eq!(by_created.data[0].id, 5);

        let by_done = run(&params(&[("sort", "done")]), sample()).unwrap();
        assert!(!by_done.data[0].done);
        assert!(by_done.data[4].done);

        let by_id = run(&params(&[("sort", "id"), ("order", "desc")]), sample()).unwrap();
        assert_eq!(by_id.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![
            5, 4, 3, 2, 1
        ]);
    }

    #[test]
    fn desc_reverses_asc_for_the_same_set() {
        let asc = run(&params(&[("sort", "title"), ("order", "asc")]), sample()).unwrap();
        let desc = run(&params(&[("sort", "title"), ("order", "desc")]), sample()).unwrap();
        let mut reversed = desc.data.clone();
        reversed.reverse();
        assert_eq!(asc.data, reversed);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        // All three share a title; insertion order must survive the sort.
        let tasks = vec![
            task(1, "same", false, "2026-08-06T08:01:00.000Z"),
            task(2, "same", true, "2026-08-06T08:02:00.000Z"),
            task(3, "same", false, "2026-08-06T08:03:00.000Z"),
        ];
        let page = run(&params(&[("sort", "title")]), tasks).unwrap();
        assert_eq!(page.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![
            1, 2, 3
        ]);
    }

    #[test]
    fn rejects_unknown_sort_field() {
        let err = run(&params(&[("sort", "priority")]), sample()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid sort field. Use one of: id, title, done, createdAt"
        );
    }

    #[test]
    fn paginates_with_limit_and_page() {
        let page = run(&params(&[("limit", "2"), ("page", "2")]), sample()).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.count, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![
            3, 4
        ]);
    }

    #[test]
    fn page_defaults_to_one() {
        let page = run(&params(&[("limit", "2")]), sample()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![
            1, 2
        ]);
    }

    #[test]
    fn partial_last_page_is_returned() {
        let page = run(&params(&[("limit", "2"), ("page", "3")]), sample()).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.data[0].id, 5);
    }

    #[test]
    fn out_of_range_page_is_empty_without_error() {
        let page = run(&params(&[("limit", "2"), ("page", "9")]), sample()).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.count, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn rejects_non_positive_or_malformed_limit() {
        for bad in ["0", "-3", "abc"] {
            let err = run(&params(&[("limit", bad)]), sample()).unwrap_err();
            assert_eq!(err.to_string(), "limit must be a positive number");
        }
    }

    #[test]
    fn rejects_negative_page_when_paginating() {
        let err = run(&params(&[("limit", "2"), ("page", "-1")]), sample()).unwrap_err();
        assert_eq!(err.to_string(), "page must be positive");
    }

    #[test]
    fn unparseable_page_falls_back_to_one() {
        let page = run(&params(&[("limit", "2"), ("page", "abc")]), sample()).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![
            1, 2
        ]);
    }

    #[test]
    fn pipeline_applies_in_fixed_order() {
        // filter (done=false: 1,3,5) -> sort by createdAt desc (5,3,1)
        // -> page 2 of limit 2 -> [1]
        let page = run(
            &params(&[
                ("done", "false"),
                ("sort", "createdAt"),
                ("order", "desc"),
                ("limit", "2"),
                ("page", "2"),
            ]),
            sample(),
        )
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.count, 1);
        assert_eq!(page.data[0].id, 1);
    }
}
