// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
// Pipeline behavior: weak-query gating, retrieval fallback, delta ordering

use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use finbot_node::rag::{RagPipeline, DEFAULT_TOP_K, FALLBACK_MESSAGE};

use super::fakes::{FakeGenerator, FakeVectorStore, GeneratorScript};

fn pipeline(
    store: &Arc<FakeVectorStore>,
    generator: &Arc<FakeGenerator>,
    min_query_len: usize,
) -> Arc<RagPipeline> {
    Arc::new(RagPipeline::new(
        Arc::clone(store) as Arc<dyn finbot_node::vector::VectorStore>,
        Arc::clone(generator) as Arc<dyn finbot_node::inference::ChatGenerator>,
        DEFAULT_TOP_K,
        min_query_len,
    ))
}

async fn collect(stream: ReceiverStream<String>) -> Vec<String> {
    stream.collect().await
}

#[tokio::test]
async fn test_weak_query_short_circuits_without_touching_providers() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["chunk"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["ignored"])));
    let pipeline = pipeline(&store, &generator, 5);

    let out = collect(pipeline.stream("hi".to_string(), vec![])).await;

    assert_eq!(out, vec![FALLBACK_MESSAGE.to_string()]);
    assert_eq!(store.call_count(), 0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_whitespace_query_yields_fallback_only() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["chunk"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["ignored"])));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("   ".to_string(), vec![])).await;

    assert_eq!(out, vec![FALLBACK_MESSAGE.to_string()]);
    assert_eq!(store.call_count(), 0);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_short_but_valid_answers_pass_the_gate() {
    for query in ["yes", "no", "42"] {
        let store = Arc::new(FakeVectorStore::with_chunks(vec![]));
        let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["ok"])));
        let pipeline = pipeline(&store, &generator, 10);

        let out = collect(pipeline.stream(query.to_string(), vec![])).await;

        assert_eq!(out, vec!["ok".to_string()], "query {:?} should reach generation", query);
        assert_eq!(generator.call_count(), 1);
    }
}

#[tokio::test]
async fn test_deltas_forwarded_verbatim_in_order() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["context"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec![
        "You", " can", " reset", " it...",
    ])));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("How do I reset my password?".to_string(), vec![])).await;

    assert_eq!(out.concat(), "You can reset it...");
    assert_eq!(out.len(), 4);
}

#[tokio::test]
async fn test_retrieval_failure_yields_fallback_as_sole_output() {
    let store = Arc::new(FakeVectorStore::failing());
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["ignored"])));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("a perfectly good question".to_string(), vec![])).await;

    assert_eq!(out, vec![FALLBACK_MESSAGE.to_string()]);
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn test_empty_retrieval_is_not_an_error() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec![]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["answer"])));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("question with no matches".to_string(), vec![])).await;

    assert_eq!(out, vec!["answer".to_string()]);
    assert_eq!(generator.seen_chunks.lock().unwrap().as_deref(), Some(&[][..]));
}

#[tokio::test]
async fn test_blank_chunks_filtered_before_generation() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["", "   ", "real chunk"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Deltas(vec!["answer"])));
    let pipeline = pipeline(&store, &generator, 1);

    collect(pipeline.stream("question".to_string(), vec![])).await;

    let seen = generator.seen_chunks.lock().unwrap().clone().unwrap();
    assert_eq!(seen, vec!["real chunk".to_string()]);
}

#[tokio::test]
async fn test_generation_open_failure_yields_fallback_only() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["context"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::FailImmediately));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("question".to_string(), vec![])).await;

    assert_eq!(out, vec![FALLBACK_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_midstream_failure_keeps_partial_and_appends_fallback() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["context"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::DeltasThenFail(vec![
        "partial ", "answer",
    ])));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("question".to_string(), vec![])).await;

    // Already-sent deltas are not retracted; fallback terminates the stream
    assert_eq!(
        out,
        vec![
            "partial ".to_string(),
            "answer".to_string(),
            FALLBACK_MESSAGE.to_string()
        ]
    );
}

#[tokio::test]
async fn test_empty_generation_yields_fallback_alone() {
    let store = Arc::new(FakeVectorStore::with_chunks(vec!["context"]));
    let generator = Arc::new(FakeGenerator::new(GeneratorScript::Empty));
    let pipeline = pipeline(&store, &generator, 1);

    let out = collect(pipeline.stream("question".to_string(), vec![])).await;

    assert_eq!(out, vec![FALLBACK_MESSAGE.to_string()]);
}
