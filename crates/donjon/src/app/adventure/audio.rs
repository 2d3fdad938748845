/// Background music held alive for the scene's lifetime; dropping the
/// player stops playback. The output stream must outlive the sink.
struct MusicPlayer {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    _sink: Sink,
}

/// Starts the looped background track at low volume. Every failure mode
/// (no audio device, missing or undecodable file) logs `music_unavailable`
/// and the game continues silently.
fn start_music(audio_dir: &std::path::Path) -> Option<MusicPlayer> {
    let path = audio_dir.join(MUSIC_FILE);

    let (stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(error) => {
            warn!(error = %error, "music_unavailable");
            return None;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(error) => {
            warn!(error = %error, "music_unavailable");
            return None;
        }
    };
    let file = match fs::File::open(&path) {
        Ok(file) => file,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "music_unavailable");
            return None;
        }
    };
    let source = match Decoder::new(BufReader::new(file)) {
        Ok(source) => source,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "music_unavailable");
            return None;
        }
    };

    sink.append(source.repeat_infinite());
    sink.set_volume(MUSIC_VOLUME);
    info!(path = %path.display(), volume = MUSIC_VOLUME, "music_started");

    Some(MusicPlayer {
        _stream: stream,
        _handle: handle,
        _sink: sink,
    })
}
