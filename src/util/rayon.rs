/*
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Thread-pool setup for `bind_modules_parallel` (spec.md §5, SPEC_FULL.md
//! §2.5): multiple modules may be bound concurrently, one `Binder` per
//! module, sharing only the process-wide flow-node/symbol-id counters.

use std::sync::LazyLock;
use std::sync::Mutex;

use rayon::ThreadPool;
use tracing::debug;

static THREADS: LazyLock<Mutex<Option<usize>>> = LazyLock::new(|| Mutex::new(None));

/// Configures the number of threads `thread_pool` builds with; `None`
/// lets rayon pick its own default (one per core).
pub fn init_rayon(threads: Option<usize>) {
    *THREADS.lock().unwrap() = threads;
}

pub fn thread_pool() -> ThreadPool {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(4 * 1024 * 1024);
    if let Some(threads) = *THREADS.lock().unwrap() {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().expect("to be able to build a thread pool");
    debug!("running with {} threads", pool.current_num_threads());
    pool
}
