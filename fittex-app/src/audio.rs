/// Audible miss feedback: a real tone on Windows, the terminal bell
/// elsewhere.
#[cfg(windows)]
pub fn beep(frequency_hz: u32, duration_ms: u64) {
    use windows::Win32::System::Diagnostics::Debug::Beep;
    unsafe {
        let _ = Beep(frequency_hz, duration_ms as u32);
    }
}

#[cfg(not(windows))]
pub fn beep(_frequency_hz: u32, _duration_ms: u64) {
    use std::io::Write;
    let mut err = std::io::stderr();
    let _ = err.write_all(b"\x07");
    let _ = err.flush();
}
