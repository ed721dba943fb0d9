use std::sync::{Arc, Mutex};

use vizij_ar_core::{
    ArConfig, ArSession, CameraImageBuffer, PlaneEvent, PointCloud, Pose, Recording,
    ReplayProvider, ScreenOrientation, SessionError, SessionStatus,
};

fn session(recording: &str, config: &str) -> ArSession<ReplayProvider> {
    let rec: Recording = vizij_ar_test_fixtures::recordings::load(recording)
        .unwrap_or_else(|e| panic!("load {recording} recording: {e:#}"));
    let cfg_json = vizij_ar_test_fixtures::configs::json(config).expect("config fixture");
    let cfg = ArConfig::from_json_str(&cfg_json).expect("config parses");
    ArSession::start(ReplayProvider::new(rec), cfg).expect("session starts")
}

fn kinds(events: &[PlaneEvent]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| match e {
            PlaneEvent::Added(_) => "added",
            PlaneEvent::Updated(_) => "updated",
            PlaneEvent::Removed(_) => "removed",
        })
        .collect()
}

#[test]
fn tabletop_plane_lifecycle() {
    let mut s = session("tabletop", "default");
    let mut per_frame = Vec::new();
    for _ in 0..7 {
        let out = s.update();
        per_frame.push(out.events.clone());
    }

    assert!(per_frame[0].is_empty(), "initializing frame is a no-op");
    assert_eq!(kinds(&per_frame[1]), ["added"]);
    // 2 mm of jitter on plane 1 is suppressed; plane 2 shows up.
    assert_eq!(kinds(&per_frame[2]), ["added"]);
    // Plane 1 grows and moves, plane 2 is subsumed into it.
    assert_eq!(kinds(&per_frame[3]), ["updated", "removed"]);
    assert!(per_frame[4].is_empty());
    assert!(per_frame[5].is_empty(), "lost tracking skips reconciliation");
    assert_eq!(kinds(&per_frame[6]), ["removed"]);

    let first_id = per_frame[1][0].plane().id;
    let second_id = per_frame[2][0].plane().id;
    assert_ne!(first_id, second_id);
    match &per_frame[3][0] {
        PlaneEvent::Updated(p) => {
            assert_eq!(p.id, first_id);
            assert_eq!(p.center, [0.05, 0.0, -1.0]);
            assert_eq!(p.extents, [0.6, 0.5]);
        }
        other => panic!("expected Updated, got {other:?}"),
    }
    assert_eq!(per_frame[3][1].plane().id, second_id);
    assert_eq!(per_frame[6][0].plane().id, first_id);
    assert_eq!(s.planes().count(), 0);
}

#[test]
fn disabled_plane_detection_emits_nothing() {
    let mut s = session("plane-churn", "no-planes");
    let heard = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&heard);
    s.subscribe(move |_| *counter.lock().unwrap() += 1);

    for _ in 0..40 {
        assert!(s.update().events.is_empty());
    }
    assert_eq!(*heard.lock().unwrap(), 0);
    assert_eq!(s.planes().count(), 0);
}

#[test]
fn enabled_plane_detection_tracks_churn() {
    let mut s = session("plane-churn", "default");
    let mut added = 0;
    let mut removed = 0;
    for _ in 0..12 {
        for e in &s.update().events {
            match e {
                PlaneEvent::Added(_) => added += 1,
                PlaneEvent::Removed(_) => removed += 1,
                PlaneEvent::Updated(_) => {}
            }
        }
        // The tracked set always mirrors the live native set.
        let live = s.provider().recording().frames[s.provider().frame_index().unwrap()]
            .planes
            .len();
        assert_eq!(s.planes().count(), live);
    }
    assert!(added > 0);
    assert_eq!(added - removed, s.planes().count());
}

#[test]
fn listeners_receive_events_in_update_order() {
    let mut s = session("tabletop", "default");
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    s.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

    let mut returned = Vec::new();
    for _ in 0..7 {
        returned.extend(s.update().events.iter().cloned());
    }
    assert_eq!(*log.lock().unwrap(), returned);
    assert_eq!(returned.len(), 5);
}

#[test]
fn fatal_status_aborts_startup() {
    let rec: Recording =
        vizij_ar_test_fixtures::recordings::load("permission-denied").expect("fixture");
    let err = ArSession::start(ReplayProvider::new(rec), ArConfig::default()).unwrap_err();
    assert!(matches!(err, SessionError::PermissionNotGranted));
    assert_eq!(
        err.to_string(),
        "camera permission is needed to run this application"
    );
}

#[test]
fn invalid_config_aborts_startup() {
    let cfg = ArConfig {
        plane_change_epsilon: f32::NAN,
        ..ArConfig::default()
    };
    let err = ArSession::start(ReplayProvider::new(Recording::default()), cfg).unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
}

#[test]
fn pose_point_cloud_and_light_follow_tracking() {
    let mut s = session("tabletop", "default");
    let mut cloud = PointCloud::default();

    s.update();
    assert_eq!(s.status(), SessionStatus::Initializing);
    assert!(s.try_get_pose().is_none());
    assert!(!s.try_get_point_cloud(&mut cloud));

    s.update();
    assert_eq!(s.try_get_pose(), Some(Pose::from_position([0.0, 1.4, 0.0])));
    assert!(s.try_get_point_cloud(&mut cloud));
    assert_eq!(cloud.len(), 3);
    let light = s.light_estimate().expect("valid estimate");
    assert!(light.capabilities.ambient_intensity);
    assert_eq!(light.ambient_intensity, 0.8);

    s.update();
    assert!(s.try_get_point_cloud(&mut cloud));
    assert_eq!(cloud.points, vec![[0.0, 0.0, -1.0]]);
}

#[test]
fn disabled_features_report_failure() {
    let mut s = session("tabletop", "luma-only");
    s.update();
    s.update();
    let mut cloud = PointCloud::default();
    assert!(!s.try_get_point_cloud(&mut cloud));
    assert!(s.light_estimate().is_none());

    let mut image = CameraImageBuffer::new();
    assert!(s.try_get_camera_image(&mut image));
    assert_eq!(image.luma().len(), 16);
    assert_eq!(image.chroma(), None);
}

#[test]
fn camera_images_across_layouts() {
    let mut s = session("tabletop", "default");
    let mut image = CameraImageBuffer::new();

    s.update();
    assert!(!s.try_get_camera_image(&mut image), "no image yet");

    s.update();
    assert!(s.try_get_camera_image(&mut image));
    assert_eq!(image.luma(), (0u8..16).collect::<Vec<_>>().as_slice());
    assert_eq!(
        image.chroma(),
        Some(&[128u8, 120, 129, 121, 130, 122, 131, 123][..])
    );

    // Padded luma rows are rejected and the previous image is left intact.
    s.update();
    assert!(!s.try_get_camera_image(&mut image));
    assert_eq!(image.luma().len(), 16);
    assert!(image.chroma().is_some());

    // Fully planar chroma: luma only.
    s.update();
    assert!(s.try_get_camera_image(&mut image));
    assert_eq!(image.luma(), &[9u8; 16][..]);
    assert_eq!(image.chroma(), None);

    s.update();
    assert!(!s.try_get_camera_image(&mut image));
}

#[test]
fn display_transform_follows_orientation() {
    let mut s = session("tabletop", "default");
    s.update();
    assert_eq!(
        s.display_transform(),
        vizij_ar_core::display_transform(ScreenOrientation::Unknown)
    );
    s.update();
    let portrait = s.display_transform();
    assert_eq!(portrait.m[0][1], -1.0);
    s.update();
    s.update();
    assert_eq!(s.display_transform().m[0][0], -1.0);
}

#[test]
fn anchors_sync_from_vendor_and_detach_on_destroy() {
    let mut s = session("tabletop", "default");
    s.update();
    assert!(
        !s.apply_anchor("cup", Pose::IDENTITY),
        "anchors need tracking"
    );

    s.update();
    assert!(s.apply_anchor("cup", Pose::from_position([0.0, 0.0, -1.0])));
    assert_eq!(s.provider().live_anchors(), 1);

    s.provider_mut()
        .set_anchor_pose(0, Some(Pose::from_position([0.0, 0.1, -1.0])));
    s.update();
    assert_eq!(
        s.anchor_pose("cup"),
        Some(Pose::from_position([0.0, 0.1, -1.0]))
    );

    // Vendor loses the anchor: last pose is kept.
    s.provider_mut().set_anchor_pose(0, None);
    s.update();
    assert_eq!(
        s.anchor_pose("cup"),
        Some(Pose::from_position([0.0, 0.1, -1.0]))
    );

    // Re-applying the same id replaces the vendor anchor.
    assert!(s.apply_anchor("cup", Pose::IDENTITY));
    assert_eq!(s.provider().live_anchors(), 1);

    assert!(s.destroy_anchor("cup"));
    assert!(!s.destroy_anchor("cup"));
    assert_eq!(s.provider().live_anchors(), 0);
    assert!(s.anchor_pose("cup").is_none());
}

#[test]
fn stop_clears_state_without_events() {
    let mut s = session("tabletop", "default");
    s.update();
    s.update();
    s.apply_anchor("a", Pose::IDENTITY);
    assert_eq!(s.planes().count(), 1);

    s.stop();
    assert!(!s.is_running());
    assert_eq!(s.status(), SessionStatus::None);
    assert_eq!(s.planes().count(), 0);
    assert!(s.anchor_pose("a").is_none());
    assert!(s.update().events.is_empty());
    assert!(s.try_get_pose().is_none());
    let mut image = CameraImageBuffer::new();
    assert!(!s.try_get_camera_image(&mut image));
}
