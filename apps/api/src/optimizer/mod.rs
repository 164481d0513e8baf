// Résumé optimization: model selection, failover invocation, and the request pipeline.
// All provider calls go through llm_client::CompletionBackend.

pub mod handlers;
pub mod invoker;
pub mod model_selector;
pub mod pipeline;
