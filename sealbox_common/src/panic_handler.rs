/// Aborts the process if any thread panics (after logging the panic).
pub fn install_panic_handler() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("panic detected: {info}");
        previous_hook(info);
        std::process::abort();
    }));
}
