use crawl_logging::{crawl_debug, crawl_info, crawl_warn};

use crate::{
    CrawlFailure, CrawlPhase, CrawlState, Effect, ExhibitPage, ExhibitRecord, JobId, ListPage,
    Msg, PartialPrincipal, SessionContext, ENTRY_URL,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested => {
            if state.phase() != CrawlPhase::Start {
                return (state, Vec::new());
            }
            state.begin_entry_fetch();
            vec![
                Effect::StartSession,
                Effect::FetchEntryPage {
                    url: ENTRY_URL.to_string(),
                },
            ]
        }
        Msg::ListPageFetched { url, body, context } => {
            on_list_page(&mut state, &url, &body, context)
        }
        Msg::ListPageFailed { url, message } => {
            if !state.expects_list_page() {
                return (state, Vec::new());
            }
            crawl_warn!("List page {url} failed: {message}");
            state.settle_list_page(false);
            state.end_pagination();
            vec![Effect::ReportError {
                failure: CrawlFailure::Fetch { message },
            }]
        }
        Msg::DetailPageFetched {
            job_id,
            principal,
            body,
        } => on_detail_page(&mut state, job_id, principal, &body),
        Msg::DetailPageFailed {
            job_id,
            principal,
            message,
        } => {
            if !state.settle_detail_fetch(job_id) {
                return (state, Vec::new());
            }
            crawl_warn!(
                "Detail page for {:?} failed: {message}",
                principal.fields().principal_name
            );
            state.record_rejected();
            vec![Effect::RecordRejected {
                job_id,
                failure: CrawlFailure::Fetch { message },
            }]
        }
        Msg::StopRequested => {
            state.end_pagination();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn on_list_page(
    state: &mut CrawlState,
    url: &str,
    body: &str,
    context: Option<SessionContext>,
) -> Vec<Effect> {
    if !state.expects_list_page() {
        crawl_warn!("Ignoring unrequested list page {url}");
        return Vec::new();
    }
    state.settle_list_page(true);

    let page = ListPage::new(url, body, context);
    let context = match page.session_context() {
        Ok(context) => context.clone(),
        Err(error) => return abort_pagination(state, error.into()),
    };
    state.context_established();

    let principals = match page.partial_principals() {
        Ok(principals) => principals,
        Err(error) => return abort_pagination(state, error.into()),
    };

    let mut effects = Vec::with_capacity(principals.len() + 1);
    for principal in principals {
        effects.push(schedule_detail_fetch(state, principal));
    }

    if !state.is_paginating() {
        return effects;
    }
    if state.reached_max_pages() {
        crawl_info!("Page limit reached after page {}", context.page_number());
        state.end_pagination();
        return effects;
    }

    let next_context = context.advanced();
    match page.next_page_request(&next_context) {
        Ok(request) => {
            crawl_debug!(
                "Requesting list page {} ({})",
                next_context.page_number(),
                request.field("p_widget_action_mod").unwrap_or_default()
            );
            state.request_list_page();
            effects.push(Effect::FetchListPage {
                request,
                context: next_context,
            });
        }
        Err(error) if error.is_pagination_end() => {
            crawl_info!("Pagination ended after page {}", context.page_number());
            state.end_pagination();
        }
        Err(error) => effects.extend(abort_pagination(state, error.into())),
    }
    effects
}

fn schedule_detail_fetch(state: &mut CrawlState, principal: PartialPrincipal) -> Effect {
    let job_id = state.allocate_job();
    if let Err(error) = principal.validate() {
        crawl_warn!(
            "Rejecting principal {:?} from list page: {error}",
            principal.fields().principal_name
        );
        state.record_rejected();
        return Effect::RecordRejected {
            job_id,
            failure: error.into(),
        };
    }

    state.track_detail_fetch(job_id);
    Effect::FetchDetailPage {
        job_id,
        url: principal.url().unwrap_or_default().to_string(),
        principal,
    }
}

fn on_detail_page(
    state: &mut CrawlState,
    job_id: JobId,
    principal: PartialPrincipal,
    body: &str,
) -> Vec<Effect> {
    if !state.settle_detail_fetch(job_id) {
        crawl_warn!("Ignoring detail page for unknown job {job_id}");
        return Vec::new();
    }

    let exhibits = ExhibitPage::new(body).exhibits();
    let assembled = exhibits
        .iter()
        .try_for_each(ExhibitRecord::validate)
        .and_then(|()| principal.merge(exhibits).into_record());

    match assembled {
        Ok(record) => {
            state.record_emitted();
            vec![Effect::EmitRecord { job_id, record }]
        }
        Err(error) => {
            crawl_warn!("Rejecting record for job {job_id}: {error}");
            state.record_rejected();
            vec![Effect::RecordRejected {
                job_id,
                failure: error.into(),
            }]
        }
    }
}

fn abort_pagination(state: &mut CrawlState, failure: CrawlFailure) -> Vec<Effect> {
    crawl_warn!("Stopping pagination: {failure}");
    state.end_pagination();
    vec![Effect::ReportError { failure }]
}
