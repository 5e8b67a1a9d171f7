//! Per-item concurrent lookups against external collaborators.

use crate::error::EngineError;

/// Apply `lookup` to every item on scoped threads.
///
/// All lookups finish before this returns. The first error in item order
/// wins, so the reported rejection does not depend on thread timing.
pub(crate) fn try_map_concurrent<T, R, F>(items: &[T], lookup: F) -> Result<Vec<R>, EngineError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, EngineError> + Sync,
{
    if items.len() <= 1 {
        return items.iter().map(&lookup).collect();
    }

    let lookup = &lookup;
    std::thread::scope(|scope| {
        let handles: Vec<_> = items
            .iter()
            .map(|item| scope.spawn(move || lookup(item)))
            .collect();
        let results: Vec<Result<R, EngineError>> = handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect();
        results.into_iter().collect()
    })
}
