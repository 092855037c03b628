use std::sync::Once;

use fara_core::{
    update, CrawlFailure, CrawlPhase, CrawlState, Effect, FaraError, JobId, Msg,
    PartialPrincipal, SessionContext, ENTRY_URL, NEXT_PAGE_URL,
};
use pretty_assertions::assert_eq;

const ENTRY_PAGE: &str = include_str!("fixtures/entry_page.html");
const LIST_PAGE_2: &str = include_str!("fixtures/list_page_2.html");
const LAST_PAGE: &str = include_str!("fixtures/last_page.html");
const EXHIBIT_PAGE: &str = include_str!("fixtures/exhibit_page.html");

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawl_logging::initialize_for_tests);
}

fn started() -> CrawlState {
    let (state, _) = update(CrawlState::new(), Msg::StartRequested);
    state
}

fn entry_fetched(state: CrawlState) -> (CrawlState, Vec<Effect>) {
    update(
        state,
        Msg::ListPageFetched {
            url: ENTRY_URL.to_string(),
            body: ENTRY_PAGE.to_string(),
            context: None,
        },
    )
}

fn detail_requests(effects: &[Effect]) -> Vec<(JobId, PartialPrincipal)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchDetailPage {
                job_id, principal, ..
            } => Some((*job_id, principal.clone())),
            _ => None,
        })
        .collect()
}

fn list_request(effects: &[Effect]) -> Option<(&fara_core::NextPageRequest, &SessionContext)> {
    effects.iter().find_map(|effect| match effect {
        Effect::FetchListPage { request, context } => Some((request, context)),
        _ => None,
    })
}

#[test]
fn start_requests_the_entry_page_once() {
    init_logging();
    let (state, effects) = update(CrawlState::new(), Msg::StartRequested);
    assert_eq!(state.phase(), CrawlPhase::FetchingEntry);
    assert_eq!(
        effects,
        vec![
            Effect::StartSession,
            Effect::FetchEntryPage {
                url: ENTRY_URL.to_string()
            },
        ]
    );

    let (state, effects) = update(state, Msg::StartRequested);
    assert_eq!(state.phase(), CrawlPhase::FetchingEntry);
    assert!(effects.is_empty());
}

#[test]
fn entry_page_schedules_details_then_next_page() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    assert_eq!(state.phase(), CrawlPhase::Paginating);

    let details = detail_requests(&effects);
    assert_eq!(details.len(), 3);
    let ids: Vec<_> = details.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let (request, context) = list_request(&effects).expect("next list page");
    assert_eq!(request.url, NEXT_PAGE_URL);
    assert_eq!(context.page_number(), 2);
    assert_eq!(context.instance_id(), "9488617858409");
    assert_eq!(
        request.field("p_widget_action_mod"),
        Some("pgR_min_row=16max_rows=30rows_fetched=15")
    );

    // The list request comes after every detail request.
    assert!(matches!(effects.last(), Some(Effect::FetchListPage { .. })));

    let summary = state.summary();
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.details_in_flight, 3);
    assert!(summary.list_page_pending);
}

#[test]
fn carried_context_threads_through_later_pages() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (_, context) = list_request(&effects).unwrap();
    let context = context.clone();

    let (state, effects) = update(
        state,
        Msg::ListPageFetched {
            url: NEXT_PAGE_URL.to_string(),
            body: LIST_PAGE_2.to_string(),
            context: Some(context.clone()),
        },
    );

    assert_eq!(detail_requests(&effects).len(), 15);
    let (request, next_context) = list_request(&effects).unwrap();
    assert_eq!(next_context, &context.advanced());
    assert_eq!(
        request.field("p_widget_action_mod"),
        Some("pgR_min_row=31max_rows=45rows_fetched=15")
    );
    assert_eq!(request.field("p_instance"), Some(context.instance_id()));
    assert_eq!(state.summary().details_in_flight, 18);
}

#[test]
fn empty_page_ends_pagination_but_not_details() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (_, context) = list_request(&effects).unwrap();
    let details = detail_requests(&effects);

    let (state, effects) = update(
        state,
        Msg::ListPageFetched {
            url: NEXT_PAGE_URL.to_string(),
            body: LAST_PAGE.to_string(),
            context: Some(context.clone()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), CrawlPhase::Ended);
    assert!(!state.is_complete());

    let mut state = state;
    for (job_id, principal) in details {
        let (next, effects) = update(
            state,
            Msg::DetailPageFetched {
                job_id,
                principal,
                body: EXHIBIT_PAGE.to_string(),
            },
        );
        assert!(matches!(effects.as_slice(), [Effect::EmitRecord { .. }]));
        state = next;
    }
    assert!(state.is_complete());
    assert_eq!(state.summary().emitted, 3);
}

#[test]
fn detail_page_merges_exhibits_into_record() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (job_id, principal) = detail_requests(&effects).remove(0);

    let (state, effects) = update(
        state,
        Msg::DetailPageFetched {
            job_id,
            principal: principal.clone(),
            body: EXHIBIT_PAGE.to_string(),
        },
    );

    let record = match effects.as_slice() {
        [Effect::EmitRecord { job_id: emitted, record }] => {
            assert_eq!(*emitted, job_id);
            record.clone()
        }
        other => panic!("unexpected effects: {other:?}"),
    };
    assert_eq!(
        Some(record.principal_name.as_str()),
        principal.fields().principal_name.as_deref()
    );
    assert_eq!(record.country, "AFGHANISTAN");
    assert_eq!(record.exhibit.len(), 2);
    assert_eq!(record.exhibit[0].date_stamped, "05/25/2007");
    assert_eq!(state.summary().emitted, 1);
    assert_eq!(state.summary().details_in_flight, 2);
}

#[test]
fn detail_page_without_exhibits_still_emits() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (job_id, principal) = detail_requests(&effects).remove(1);

    let (_, effects) = update(
        state,
        Msg::DetailPageFetched {
            job_id,
            principal,
            body: "<html><body><p>No data found.</p></body></html>".to_string(),
        },
    );
    match effects.as_slice() {
        [Effect::EmitRecord { record, .. }] => assert!(record.exhibit.is_empty()),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn invalid_exhibit_rejects_the_record() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (job_id, principal) = detail_requests(&effects).remove(0);
    let body = EXHIBIT_PAGE.replace("05/25/2007", "");

    let (state, effects) = update(
        state,
        Msg::DetailPageFetched {
            job_id,
            principal,
            body,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RecordRejected {
            job_id,
            failure: CrawlFailure::Parse(FaraError::InvalidExhibit {
                field: "date_stamped"
            }),
        }]
    );
    assert_eq!(state.summary().rejected, 1);
}

#[test]
fn duplicate_detail_delivery_is_ignored() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (job_id, principal) = detail_requests(&effects).remove(0);
    let msg = Msg::DetailPageFetched {
        job_id,
        principal,
        body: EXHIBIT_PAGE.to_string(),
    };

    let (state, first) = update(state, msg.clone());
    let (state, second) = update(state, msg);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(state.summary().emitted, 1);
}

#[test]
fn entry_page_without_tokens_stops_the_crawl() {
    init_logging();
    let (state, effects) = update(
        started(),
        Msg::ListPageFetched {
            url: ENTRY_URL.to_string(),
            body: LIST_PAGE_2.to_string(),
            context: None,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ReportError {
            failure: CrawlFailure::Parse(FaraError::SessionTokenMissing {
                token: "p_instance"
            }),
        }]
    );
    assert_eq!(state.phase(), CrawlPhase::Ended);
    assert!(state.is_complete());
}

#[test]
fn list_page_failure_ends_pagination() {
    init_logging();
    let (state, effects) = update(
        started(),
        Msg::ListPageFailed {
            url: ENTRY_URL.to_string(),
            message: "http status 404".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ReportError {
            failure: CrawlFailure::Fetch {
                message: "http status 404".to_string()
            },
        }]
    );
    assert!(state.is_complete());
}

#[test]
fn detail_failure_rejects_only_that_record() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (job_id, principal) = detail_requests(&effects).remove(2);

    let (state, effects) = update(
        state,
        Msg::DetailPageFailed {
            job_id,
            principal,
            message: "timeout".to_string(),
        },
    );
    assert!(matches!(
        effects.as_slice(),
        [Effect::RecordRejected {
            failure: CrawlFailure::Fetch { .. },
            ..
        }]
    ));
    assert_eq!(state.phase(), CrawlPhase::Paginating);
    assert_eq!(state.summary().details_in_flight, 2);
}

#[test]
fn stop_keeps_pending_pages_but_schedules_no_more_lists() {
    init_logging();
    let (state, effects) = entry_fetched(started());
    let (_, context) = list_request(&effects).unwrap();
    let context = context.clone();

    let (state, effects) = update(state, Msg::StopRequested);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), CrawlPhase::Ended);
    assert!(!state.is_complete());

    // The list page already requested still has its principals followed up.
    let (state, effects) = update(
        state,
        Msg::ListPageFetched {
            url: NEXT_PAGE_URL.to_string(),
            body: LIST_PAGE_2.to_string(),
            context: Some(context),
        },
    );
    assert_eq!(detail_requests(&effects).len(), 15);
    assert!(list_request(&effects).is_none());
    assert_eq!(state.summary().details_in_flight, 18);
}

#[test]
fn page_limit_stops_after_configured_pages() {
    init_logging();
    let (state, _) = update(CrawlState::with_max_pages(Some(1)), Msg::StartRequested);
    let (state, effects) = entry_fetched(state);

    assert_eq!(detail_requests(&effects).len(), 3);
    assert!(list_request(&effects).is_none());
    assert_eq!(state.phase(), CrawlPhase::Ended);
}

#[test]
fn unrequested_list_page_is_ignored() {
    init_logging();
    let (state, effects) = entry_fetched(CrawlState::new());
    assert!(effects.is_empty());
    assert_eq!(state.phase(), CrawlPhase::Start);
}

#[test]
fn dirty_flag_tracks_changes() {
    let (mut state, _) = update(CrawlState::new(), Msg::StartRequested);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());

    let (mut state, _) = update(state, Msg::Tick);
    assert!(!state.consume_dirty());
}
