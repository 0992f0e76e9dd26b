//! Integration tests driving the modem client against a scripted transceiver

use crate::client::*;
use crate::datatypes::BufferStatus;
use crate::telemetry::Telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// What the fake transceiver does after receiving a command line
enum Reply {
    Text(&'static str),
    Silent,
}

/// Fake transceiver on the far end of a duplex pipe
///
/// Each step asserts the next command line (up to `\r`) and then answers.
/// Commands beyond the script are recorded and left unanswered. The task
/// returns every command it saw once the client end is dropped.
fn scripted_modem(script: Vec<(&'static str, Reply)>) -> (DuplexStream, JoinHandle<Vec<String>>) {
    let (client, mut modem) = duplex(4096);

    let handle = tokio::spawn(async move {
        let mut script = script.into_iter();
        let mut seen = Vec::new();

        while let Some(command) = read_command(&mut modem).await {
            seen.push(command.clone());
            match script.next() {
                Some((expected, reply)) => {
                    assert_eq!(command, expected, "unexpected command");
                    if let Reply::Text(text) = reply {
                        modem.write_all(text.as_bytes()).await.unwrap();
                    }
                }
                None => continue,
            }
        }
        seen
    });

    (client, handle)
}

async fn read_command(stream: &mut DuplexStream) -> Option<String> {
    let mut line = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => return None,
            Ok(_) if byte[0] == b'\r' => return Some(String::from_utf8_lossy(&line).into_owned()),
            Ok(_) => line.push(byte[0]),
        }
    }
}

async fn finish<T>(modem: DefaultModem<T>, handle: JoinHandle<Vec<String>>) -> Vec<String>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    drop(modem);
    handle.await.unwrap()
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_iteration_session() {
        let (port, handle) = scripted_modem(vec![(
            "AT+SBDIX",
            Reply::Text("AT+SBDIX\r\r\n+SBDIX: 0, 1, 0, -1, 0, 0\r\n\r\nOK\r\n"),
        )]);
        let mut modem = DefaultModem::new(port);

        let received = modem.initiate_session().await.unwrap();

        assert!(received.is_empty());
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDIX"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_collects_every_queued_message() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, 1, 7, 40, 1\r\n")),
            (
                "AT+SBDRT",
                Reply::Text("+SBDRT:\r\n05/11/14, 14:39. Test message.\r\nOK\r\n"),
            ),
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 2, 1, 8, 6, 0\r\n")),
            ("AT+SBDRT", Reply::Text("+SBDRT:\r\nsecond\r\nOK\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        let received = modem.initiate_session().await.unwrap();

        assert_eq!(received, vec!["05/11/14, 14:39. Test message.", "second"]);
        assert_eq!(
            finish(modem, handle).await,
            vec!["AT+SBDIX", "AT+SBDRT", "AT+SBDIX", "AT+SBDRT"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_containing_ok_is_delivered() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, 1, 7, 22, 0\r")),
            ("AT+SBDRT", Reply::Text("+SBDRT:\rStatus OK, battery 80%\rOK\r")),
        ]);
        let mut modem = DefaultModem::new(port);

        let received = modem.initiate_session().await.unwrap();

        assert_eq!(received, vec!["Status OK, battery 80%"]);
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDIX", "AT+SBDRT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieval_error_forces_another_iteration() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, 2, -1, 0, 0\r\n")),
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, 0, -1, 0, 0\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.initiate_session().await.unwrap().is_empty());
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDIX", "AT+SBDIX"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mo_status_is_retried_even_when_fatal() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Text("+SBDIX: 18, 3, 0, -1, 0, 0\r\n")),
            ("AT+SBDIX", Reply::Text("+SBDIX: 34, 3, 0, -1, 0, 0\r\n")),
            ("AT+SBDIX", Reply::Text("+SBDIX: 1, 3, 0, -1, 0, 0\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.initiate_session().await.unwrap().is_empty());
        assert_eq!(finish(modem, handle).await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_reply_runs_buffer_diagnostic_then_retries() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Silent),
            ("AT+SBDSX", Reply::Text("+SBDSX: 0, 5, 0, -1, 0, 0\r\n")),
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 5, 0, -1, 0, 0\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.initiate_session().await.unwrap().is_empty());
        assert_eq!(
            finish(modem, handle).await,
            vec!["AT+SBDIX", "AT+SBDSX", "AT+SBDIX"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_session_reply_is_retried() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, garbage\r\n")),
            ("AT+SBDIX", Reply::Text("+SBDIX: 0, 1, 0, -1, 0, 0\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.initiate_session().await.unwrap().is_empty());
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDIX", "AT+SBDIX"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_link_ends_session_with_error() {
        let (port, far_end) = duplex(64);
        drop(far_end);
        let mut modem = DefaultModem::new(port);

        let err = modem.initiate_session().await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_lines_are_published() {
        let (port, handle) = scripted_modem(vec![(
            "AT+SBDIX",
            Reply::Text("+SBDIX: 0, 1, 0, -1, 0, 0\r\n"),
        )]);
        let (tx, mut rx) = mpsc::channel(64);
        let mut modem = DefaultModem::with_config(
            port,
            ModemConfig::default(),
            Telemetry::with_publisher(tx),
        );

        modem.initiate_session().await.unwrap();
        finish(modem, handle).await;

        let mut lines = Vec::new();
        while let Ok(record) = rx.try_recv() {
            assert_eq!(record.topic, "IridiumLog");
            lines.push(record.line);
        }
        assert!(lines.iter().any(|line| line.ends_with(",Sending command: AT+SBDIX")));
        assert!(lines
            .iter()
            .any(|line| line.ends_with(",MO status: 0, MT status: 0, MT queued: 0")));
    }
}

#[cfg(test)]
mod buffer_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mo_flag_reads_outbound_buffer_only() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDSX", Reply::Text("+SBDSX: 1, 5, 0, -1, 0, 0\r\n")),
            (
                "AT+SBDTC",
                Reply::Text("SBDTC: Outbound SBD Copied to Inbound SBD: size = 5\r\n"),
            ),
            ("AT+SBDRT", Reply::Text("+SBDRT:\r\nhello\r\nOK\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        let status = modem.buffer_status(BufferAction::Inspect).await.unwrap();

        assert_eq!(
            status,
            BufferStatus {
                mo_flag: 1,
                mo_msn: 5,
                mt_flag: 0,
                mt_msn: -1,
                ring_alert: 0,
                queued: 0,
            }
        );
        assert_eq!(
            finish(modem, handle).await,
            vec!["AT+SBDSX", "AT+SBDTC", "AT+SBDRT"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_reads_inbound_buffer_then_clears() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDSX", Reply::Text("+SBDSX: 0, 5, 1, 3, 0, 0\r\n")),
            ("AT+SBDRT", Reply::Text("+SBDRT:\r\ninbound\r\nOK\r\n")),
            ("AT+SBDD2", Reply::Text("0\r\n\r\nOK\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        let status = modem.clear_buffers().await.unwrap();

        assert!(status.has_mt_message());
        assert_eq!(
            finish(modem, handle).await,
            vec!["AT+SBDSX", "AT+SBDRT", "AT+SBDD2"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_buffers_are_not_cleared() {
        let (port, handle) = scripted_modem(vec![(
            "AT+SBDSX",
            Reply::Text("+SBDSX: 0, 5, 0, -1, 0, 0\r\n"),
        )]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.clear_buffers().await.unwrap().is_empty());
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDSX"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_text_strips_framing() {
        let (port, handle) = scripted_modem(vec![(
            "AT+SBDRT",
            Reply::Text("+SBDRT:\r05/11/14, 14:39. Test message.\rOK\r"),
        )]);
        let mut modem = DefaultModem::new(port);

        assert_eq!(
            modem.get_text().await.unwrap(),
            "05/11/14, 14:39. Test message."
        );
        finish(modem, handle).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffer_message() {
        let (port, handle) = scripted_modem(vec![
            ("AT+SBDWT", Reply::Text("AT+SBDWT\r\nREADY\r\n")),
            ("Position 51.5N 0.1W", Reply::Text("\r\n0\r\n\r\nOK\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(modem.buffer_message("Position 51.5N 0.1W").await);
        finish(modem, handle).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffer_message_without_ready() {
        let (port, handle) = scripted_modem(vec![("AT+SBDWT", Reply::Text("ERROR\r\n"))]);
        let mut modem = DefaultModem::new(port);

        assert!(!modem.buffer_message("never sent").await);
        assert_eq!(finish(modem, handle).await, vec!["AT+SBDWT"]);
    }
}

#[cfg(test)]
mod control_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bring_up_sequence() {
        let (port, handle) = scripted_modem(vec![
            ("AT", Reply::Text("AT\r\r\nOK\r\n")),
            ("AT+SBDAREG=1", Reply::Text("OK\r\n")),
            ("AT+CIER=1,0,1", Reply::Text("OK\r\n")),
            ("AT+SBDMTA=1", Reply::Text("OK\r\n")),
        ]);

        let (modem, ready) = ModemBuilder::new().bring_up(port).await;

        assert!(ready);
        assert_eq!(finish(modem, handle).await.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_transceiver_is_not_connected() {
        let (port, handle) = scripted_modem(vec![("AT", Reply::Silent)]);
        let mut modem = DefaultModem::new(port);

        assert!(!modem.check_connected().await);
        assert_eq!(finish(modem, handle).await, vec!["AT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_modem_serialises_commands() {
        let (port, handle) = scripted_modem(vec![
            ("AT", Reply::Text("AT\r\r\nOK\r\n")),
            ("AT", Reply::Text("AT\r\r\nOK\r\n")),
        ]);
        let shared: SharedModem<_> = Arc::new(Mutex::new(DefaultModem::new(port)));

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let modem = Arc::clone(&shared);
                tokio::spawn(async move { modem.lock().await.check_connected().await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }

        let modem = Arc::try_unwrap(shared).ok().unwrap().into_inner();
        assert_eq!(finish(modem, handle).await, vec!["AT", "AT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_strength() {
        let (port, handle) = scripted_modem(vec![("AT+CSQ", Reply::Text("+CSQ:3\r\n\r\nOK\r\n"))]);
        let mut modem = DefaultModem::new(port);

        assert_eq!(modem.check_signal_strength().await.unwrap(), 3);
        finish(modem, handle).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_signal_strength_polls_until_strong_enough() {
        let (port, handle) = scripted_modem(vec![
            ("AT+CSQ", Reply::Text("+CSQ:1\r\n")),
            ("AT+CSQ", Reply::Text("+CSQ:2\r\n")),
            ("AT+CSQ", Reply::Text("+CSQ:4\r\n")),
        ]);
        let mut modem = DefaultModem::new(port);

        assert!(
            modem
                .wait_for_signal_strength(2, Duration::from_secs(120))
                .await
        );
        assert_eq!(finish(modem, handle).await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_signal_strength_times_out() {
        let (port, handle) = scripted_modem(vec![
            ("AT+CSQ", Reply::Text("+CSQ:0\r\n")),
            ("AT+CSQ", Reply::Text("+CSQ:0\r\n")),
        ]);
        let config = ModemConfig::default().with_signal_poll_interval(Duration::from_secs(5));
        let mut modem = DefaultModem::with_config(port, config, Telemetry::new());

        // Each poll costs a 3s settle plus the 5s interval, so 10s allows two.
        assert!(
            !modem
                .wait_for_signal_strength(2, Duration::from_secs(10))
                .await
        );
        assert_eq!(finish(modem, handle).await.len(), 2);
    }
}
