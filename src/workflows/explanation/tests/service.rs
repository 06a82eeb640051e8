use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::common::*;
use crate::config::ExplanationSettings;
use crate::workflows::explanation::cache::{cache_key, ExplanationCache};
use crate::workflows::explanation::domain::{ExplanationSource, FallbackReason};
use crate::workflows::explanation::{
    BatchRequest, ExplanationError, ExplanationService, InMemoryExplanationCache,
};
use crate::workflows::matching::{ProgramId, ProgramStatus};

#[tokio::test(start_paused = true)]
async fn generated_explanation_is_cached_and_reused() {
    let (service, provider, cache) = service_with(ScriptedProvider::default(), &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let first = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");
    assert_eq!(first.source, ExplanationSource::Generated);
    assert!(!first.cached);
    assert_eq!(first.cost_usd, REPLY_COST_USD);
    assert_eq!(first.content.cautions, vec!["세부 제출 서류를 확인하세요."]);

    let second = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");
    assert_eq!(second.source, ExplanationSource::Cache);
    assert!(second.cached);
    assert_eq!(second.cost_usd, 0.0);
    assert_eq!(second.content, first.content);

    assert_eq!(provider.calls(), 1);
    let key = cache_key(&score.organization_id, &score.program_id, ProgramStatus::Active);
    assert!(cache.get(&key).await.expect("cache readable").is_some());
}

#[tokio::test(start_paused = true)]
async fn status_change_forces_regeneration() {
    let (service, provider, _) = service_with(ScriptedProvider::default(), &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    for status in [ProgramStatus::Active, ProgramStatus::Expired] {
        service
            .explain(&org_summary(), &summary_of(&program), &score, status)
            .await
            .expect("explained");
    }

    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn malformed_reply_falls_back_and_is_not_cached() {
    let provider = ScriptedProvider::new([Reply::Text("지원사업과 잘 맞습니다.")]);
    let (service, _, cache) = service_with(provider, &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");

    assert_eq!(explanation.source, ExplanationSource::Fallback);
    assert_eq!(
        explanation.fallback_reason,
        Some(FallbackReason::MalformedResponse)
    );
    assert!(!explanation.cached);
    assert_eq!(explanation.cost_usd, 0.0);
    assert!(explanation.content.summary.contains("한빛시큐리티"));
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_open_the_circuit_and_stop_provider_calls() {
    let provider = ScriptedProvider::new([Reply::Fail, Reply::Fail, Reply::Fail]);
    let (service, provider, cache) = service_with(provider, &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    for _ in 0..3 {
        let explanation = service
            .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
            .await
            .expect("explained");
        assert_eq!(
            explanation.fallback_reason,
            Some(FallbackReason::ProviderError)
        );
    }

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");
    assert_eq!(explanation.fallback_reason, Some(FallbackReason::CircuitOpen));
    assert_eq!(provider.calls(), 3);
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out_into_fallback() {
    let (service, _, _) = service_with(ScriptedProvider::new([Reply::Hang]), &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");

    assert_eq!(explanation.fallback_reason, Some(FallbackReason::Timeout));
    assert!(explanation.latency_ms >= 30_000);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_provider_call() {
    let provider = ScriptedProvider::default().with_latency(Duration::from_millis(200));
    let (service, provider, _) = service_with(provider, &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);
    let organization = org_summary();
    let summary = summary_of(&program);

    let (first, second) = tokio::join!(
        service.explain(&organization, &summary, &score, ProgramStatus::Active),
        service.explain(&organization, &summary, &score, ProgramStatus::Active),
    );

    assert_eq!(provider.calls(), 1);
    assert_eq!(first.expect("explained"), second.expect("explained"));
}

#[tokio::test]
async fn exhausted_budget_serves_fallback() {
    let settings = ExplanationSettings {
        daily_budget_usd: 0.0,
        ..settings()
    };
    let (service, provider, _) = service_with(ScriptedProvider::default(), &settings);
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");

    assert_eq!(
        explanation.fallback_reason,
        Some(FallbackReason::BudgetExhausted)
    );
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn inconsistent_wording_is_logged_not_blocked() {
    let reply = r#"{"summary": "지금 바로 신청하세요.", "recommendation": "서둘러 지원하세요."}"#;
    let provider = ScriptedProvider::new([Reply::Text(reply)]);
    let (service, _, cache) = service_with(provider, &settings());
    let program = program("PRG-1", ProgramStatus::Expired);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Expired)
        .await
        .expect("explained");

    assert_eq!(explanation.source, ExplanationSource::Generated);
    assert_eq!(explanation.content.summary, "지금 바로 신청하세요.");
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unreadable_cache_is_treated_as_a_miss() {
    let provider = Arc::new(ScriptedProvider::default());
    let service = ExplanationService::new(provider.clone(), Arc::new(BrokenCache), &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");

    assert_eq!(explanation.source, ExplanationSource::Generated);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn score_for_another_program_is_rejected() {
    let (service, provider, _) = service_with(ScriptedProvider::default(), &settings());
    let target = program("PRG-1", ProgramStatus::Active);
    let other = program("PRG-2", ProgramStatus::Active);

    let err = service
        .explain(
            &org_summary(),
            &summary_of(&target),
            &score_for(&other),
            ProgramStatus::Active,
        )
        .await
        .expect_err("mismatched score");

    assert!(matches!(err, ExplanationError::ScoreMismatch { .. }));
    assert_eq!(provider.calls(), 0);
}

fn batch_request(id: &str) -> BatchRequest {
    let program = program(id, ProgramStatus::Active);
    BatchRequest {
        program: summary_of(&program),
        score: score_for(&program),
        status: ProgramStatus::Active,
    }
}

#[tokio::test(start_paused = true)]
async fn batch_is_paced_and_survives_item_failures() {
    let provider = Arc::new(ScriptedProvider::default());
    let cache = Arc::new(InMemoryExplanationCache::new());
    let service = ExplanationService::new(provider.clone(), cache, &settings());

    let mut mismatched = batch_request("PRG-3");
    mismatched.program.id = ProgramId("PRG-9".to_string());
    let requests = vec![batch_request("PRG-1"), batch_request("PRG-2"), mismatched];

    let started = Instant::now();
    let report = service.explain_batch(&org_summary(), &requests).await;

    assert_eq!(report.items.len(), 3);
    assert_eq!(report.generated, 2);
    assert_eq!(report.failed, 1);
    assert!(report.items[2].error.is_some());
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3000));
    assert!(elapsed < Duration::from_millis(4500));

    let started = Instant::now();
    let report = service
        .explain_batch(&org_summary(), &requests[..2])
        .await;

    assert_eq!(report.cached, 2);
    assert_eq!(report.generated, 0);
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_cache_reads_do_not_duplicate_an_in_flight_generation() {
    let provider = Arc::new(ScriptedProvider::default().with_latency(Duration::from_millis(10)));
    let cache = Arc::new(SlowReadCache::new(Duration::from_millis(50)));
    let service = ExplanationService::new(provider.clone(), cache, &settings());
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);
    let organization = org_summary();
    let summary = summary_of(&program);

    let (first, second) = tokio::join!(
        service.explain(&organization, &summary, &score, ProgramStatus::Active),
        async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            service
                .explain(&organization, &summary, &score, ProgramStatus::Active)
                .await
        }
    );

    assert_eq!(provider.calls(), 1);
    assert_eq!(
        first.expect("explained").content,
        second.expect("explained").content
    );
}

#[tokio::test(start_paused = true)]
async fn hanging_cache_is_bypassed_after_the_cache_timeout() {
    let settings = ExplanationSettings {
        cache_timeout: Duration::from_millis(100),
        ..settings()
    };
    let provider = Arc::new(ScriptedProvider::default());
    let service = ExplanationService::new(provider.clone(), Arc::new(HangingCache), &settings);
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let explanation = service
        .explain(&org_summary(), &summary_of(&program), &score, ProgramStatus::Active)
        .await
        .expect("explained");

    assert_eq!(explanation.source, ExplanationSource::Generated);
    assert_eq!(provider.calls(), 1);
    assert!(explanation.latency_ms < 1_000);
}
