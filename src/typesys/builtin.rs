// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Built-in message definitions covering the standard ROS2 distribution.
//!
//! The definitions are stored as `.msg` texts and parsed once when the
//! default registry initializes. Generated per-type code would work as well
//! but is not required; parsing a few hundred short texts is a one-time
//! cost per process.

use std::collections::BTreeMap;

use super::ast::MsgDef;
use super::msg::parse_msg;

/// Parse the complete built-in type set.
pub fn builtin_types() -> BTreeMap<String, MsgDef> {
    let mut defs = BTreeMap::new();
    for (name, text) in BUILTINS {
        let parsed = parse_msg(text, name)
            .unwrap_or_else(|err| panic!("builtin definition {name} failed to parse: {err}"));
        defs.extend(parsed);
    }
    defs
}

/// `(fully-qualified name, definition text)` for every built-in type.
const BUILTINS: &[(&str, &str)] = &[
    // builtin_interfaces
    ("builtin_interfaces/msg/Time", "int32 sec\nuint32 nanosec\n"),
    (
        "builtin_interfaces/msg/Duration",
        "int32 sec\nuint32 nanosec\n",
    ),
    // std_msgs
    ("std_msgs/msg/Bool", "bool data\n"),
    ("std_msgs/msg/Byte", "byte data\n"),
    ("std_msgs/msg/ByteMultiArray", "MultiArrayLayout layout\nbyte[] data\n"),
    ("std_msgs/msg/Char", "char data\n"),
    (
        "std_msgs/msg/ColorRGBA",
        "float32 r\nfloat32 g\nfloat32 b\nfloat32 a\n",
    ),
    ("std_msgs/msg/Empty", ""),
    ("std_msgs/msg/Float32", "float32 data\n"),
    (
        "std_msgs/msg/Float32MultiArray",
        "MultiArrayLayout layout\nfloat32[] data\n",
    ),
    ("std_msgs/msg/Float64", "float64 data\n"),
    (
        "std_msgs/msg/Float64MultiArray",
        "MultiArrayLayout layout\nfloat64[] data\n",
    ),
    (
        "std_msgs/msg/Header",
        "builtin_interfaces/Time stamp\nstring frame_id\n",
    ),
    ("std_msgs/msg/Int8", "int8 data\n"),
    (
        "std_msgs/msg/Int8MultiArray",
        "MultiArrayLayout layout\nint8[] data\n",
    ),
    ("std_msgs/msg/Int16", "int16 data\n"),
    (
        "std_msgs/msg/Int16MultiArray",
        "MultiArrayLayout layout\nint16[] data\n",
    ),
    ("std_msgs/msg/Int32", "int32 data\n"),
    (
        "std_msgs/msg/Int32MultiArray",
        "MultiArrayLayout layout\nint32[] data\n",
    ),
    ("std_msgs/msg/Int64", "int64 data\n"),
    (
        "std_msgs/msg/Int64MultiArray",
        "MultiArrayLayout layout\nint64[] data\n",
    ),
    (
        "std_msgs/msg/MultiArrayDimension",
        "string label\nuint32 size\nuint32 stride\n",
    ),
    (
        "std_msgs/msg/MultiArrayLayout",
        "MultiArrayDimension[] dim\nuint32 data_offset\n",
    ),
    ("std_msgs/msg/String", "string data\n"),
    ("std_msgs/msg/UInt8", "uint8 data\n"),
    (
        "std_msgs/msg/UInt8MultiArray",
        "MultiArrayLayout layout\nuint8[] data\n",
    ),
    ("std_msgs/msg/UInt16", "uint16 data\n"),
    (
        "std_msgs/msg/UInt16MultiArray",
        "MultiArrayLayout layout\nuint16[] data\n",
    ),
    ("std_msgs/msg/UInt32", "uint32 data\n"),
    (
        "std_msgs/msg/UInt32MultiArray",
        "MultiArrayLayout layout\nuint32[] data\n",
    ),
    ("std_msgs/msg/UInt64", "uint64 data\n"),
    (
        "std_msgs/msg/UInt64MultiArray",
        "MultiArrayLayout layout\nuint64[] data\n",
    ),
    // geometry_msgs
    ("geometry_msgs/msg/Accel", "Vector3 linear\nVector3 angular\n"),
    (
        "geometry_msgs/msg/AccelStamped",
        "std_msgs/Header header\nAccel accel\n",
    ),
    (
        "geometry_msgs/msg/AccelWithCovariance",
        "Accel accel\nfloat64[36] covariance\n",
    ),
    (
        "geometry_msgs/msg/AccelWithCovarianceStamped",
        "std_msgs/Header header\nAccelWithCovariance accel\n",
    ),
    (
        "geometry_msgs/msg/Inertia",
        "float64 m\nVector3 com\nfloat64 ixx\nfloat64 ixy\nfloat64 ixz\nfloat64 iyy\nfloat64 iyz\nfloat64 izz\n",
    ),
    (
        "geometry_msgs/msg/InertiaStamped",
        "std_msgs/Header header\nInertia inertia\n",
    ),
    (
        "geometry_msgs/msg/Point",
        "float64 x\nfloat64 y\nfloat64 z\n",
    ),
    (
        "geometry_msgs/msg/Point32",
        "float32 x\nfloat32 y\nfloat32 z\n",
    ),
    (
        "geometry_msgs/msg/PointStamped",
        "std_msgs/Header header\nPoint point\n",
    ),
    ("geometry_msgs/msg/Polygon", "Point32[] points\n"),
    (
        "geometry_msgs/msg/PolygonStamped",
        "std_msgs/Header header\nPolygon polygon\n",
    ),
    (
        "geometry_msgs/msg/Pose",
        "Point position\nQuaternion orientation\n",
    ),
    (
        "geometry_msgs/msg/Pose2D",
        "float64 x\nfloat64 y\nfloat64 theta\n",
    ),
    (
        "geometry_msgs/msg/PoseArray",
        "std_msgs/Header header\nPose[] poses\n",
    ),
    (
        "geometry_msgs/msg/PoseStamped",
        "std_msgs/Header header\nPose pose\n",
    ),
    (
        "geometry_msgs/msg/PoseWithCovariance",
        "Pose pose\nfloat64[36] covariance\n",
    ),
    (
        "geometry_msgs/msg/PoseWithCovarianceStamped",
        "std_msgs/Header header\nPoseWithCovariance pose\n",
    ),
    (
        "geometry_msgs/msg/Quaternion",
        "float64 x 0\nfloat64 y 0\nfloat64 z 0\nfloat64 w 1\n",
    ),
    (
        "geometry_msgs/msg/QuaternionStamped",
        "std_msgs/Header header\nQuaternion quaternion\n",
    ),
    (
        "geometry_msgs/msg/Transform",
        "Vector3 translation\nQuaternion rotation\n",
    ),
    (
        "geometry_msgs/msg/TransformStamped",
        "std_msgs/Header header\nstring child_frame_id\nTransform transform\n",
    ),
    (
        "geometry_msgs/msg/Twist",
        "Vector3 linear\nVector3 angular\n",
    ),
    (
        "geometry_msgs/msg/TwistStamped",
        "std_msgs/Header header\nTwist twist\n",
    ),
    (
        "geometry_msgs/msg/TwistWithCovariance",
        "Twist twist\nfloat64[36] covariance\n",
    ),
    (
        "geometry_msgs/msg/TwistWithCovarianceStamped",
        "std_msgs/Header header\nTwistWithCovariance twist\n",
    ),
    (
        "geometry_msgs/msg/Vector3",
        "float64 x\nfloat64 y\nfloat64 z\n",
    ),
    (
        "geometry_msgs/msg/Vector3Stamped",
        "std_msgs/Header header\nVector3 vector\n",
    ),
    (
        "geometry_msgs/msg/Wrench",
        "Vector3 force\nVector3 torque\n",
    ),
    (
        "geometry_msgs/msg/WrenchStamped",
        "std_msgs/Header header\nWrench wrench\n",
    ),
    // sensor_msgs
    (
        "sensor_msgs/msg/CameraInfo",
        "std_msgs/Header header\nuint32 height\nuint32 width\nstring distortion_model\nfloat64[] d\nfloat64[9] k\nfloat64[9] r\nfloat64[12] p\nuint32 binning_x\nuint32 binning_y\nRegionOfInterest roi\n",
    ),
    (
        "sensor_msgs/msg/ChannelFloat32",
        "string name\nfloat32[] values\n",
    ),
    (
        "sensor_msgs/msg/CompressedImage",
        "std_msgs/Header header\nstring format\nuint8[] data\n",
    ),
    (
        "sensor_msgs/msg/FluidPressure",
        "std_msgs/Header header\nfloat64 fluid_pressure\nfloat64 variance\n",
    ),
    (
        "sensor_msgs/msg/Illuminance",
        "std_msgs/Header header\nfloat64 illuminance\nfloat64 variance\n",
    ),
    (
        "sensor_msgs/msg/Image",
        "std_msgs/Header header\nuint32 height\nuint32 width\nstring encoding\nuint8 is_bigendian\nuint32 step\nuint8[] data\n",
    ),
    (
        "sensor_msgs/msg/Imu",
        "std_msgs/Header header\ngeometry_msgs/Quaternion orientation\nfloat64[9] orientation_covariance\ngeometry_msgs/Vector3 angular_velocity\nfloat64[9] angular_velocity_covariance\ngeometry_msgs/Vector3 linear_acceleration\nfloat64[9] linear_acceleration_covariance\n",
    ),
    (
        "sensor_msgs/msg/JointState",
        "std_msgs/Header header\nstring[] name\nfloat64[] position\nfloat64[] velocity\nfloat64[] effort\n",
    ),
    (
        "sensor_msgs/msg/Joy",
        "std_msgs/Header header\nfloat32[] axes\nint32[] buttons\n",
    ),
    (
        "sensor_msgs/msg/LaserScan",
        "std_msgs/Header header\nfloat32 angle_min\nfloat32 angle_max\nfloat32 angle_increment\nfloat32 time_increment\nfloat32 scan_time\nfloat32 range_min\nfloat32 range_max\nfloat32[] ranges\nfloat32[] intensities\n",
    ),
    (
        "sensor_msgs/msg/MagneticField",
        "std_msgs/Header header\ngeometry_msgs/Vector3 magnetic_field\nfloat64[9] magnetic_field_covariance\n",
    ),
    (
        "sensor_msgs/msg/NavSatFix",
        "uint8 COVARIANCE_TYPE_UNKNOWN=0\nuint8 COVARIANCE_TYPE_APPROXIMATED=1\nuint8 COVARIANCE_TYPE_DIAGONAL_KNOWN=2\nuint8 COVARIANCE_TYPE_KNOWN=3\nstd_msgs/Header header\nNavSatStatus status\nfloat64 latitude\nfloat64 longitude\nfloat64 altitude\nfloat64[9] position_covariance\nuint8 position_covariance_type\n",
    ),
    (
        "sensor_msgs/msg/NavSatStatus",
        "int8 STATUS_NO_FIX=-1\nint8 STATUS_FIX=0\nint8 STATUS_SBAS_FIX=1\nint8 STATUS_GBAS_FIX=2\nuint16 SERVICE_GPS=1\nuint16 SERVICE_GLONASS=2\nuint16 SERVICE_COMPASS=4\nuint16 SERVICE_GALILEO=8\nint8 status\nuint16 service\n",
    ),
    (
        "sensor_msgs/msg/PointCloud",
        "std_msgs/Header header\ngeometry_msgs/Point32[] points\nChannelFloat32[] channels\n",
    ),
    (
        "sensor_msgs/msg/PointCloud2",
        "std_msgs/Header header\nuint32 height\nuint32 width\nPointField[] fields\nbool is_bigendian\nuint32 point_step\nuint32 row_step\nuint8[] data\nbool is_dense\n",
    ),
    (
        "sensor_msgs/msg/PointField",
        "uint8 INT8=1\nuint8 UINT8=2\nuint8 INT16=3\nuint8 UINT16=4\nuint8 INT32=5\nuint8 UINT32=6\nuint8 FLOAT32=7\nuint8 FLOAT64=8\nstring name\nuint32 offset\nuint8 datatype\nuint32 count\n",
    ),
    (
        "sensor_msgs/msg/Range",
        "uint8 ULTRASOUND=0\nuint8 INFRARED=1\nstd_msgs/Header header\nuint8 radiation_type\nfloat32 field_of_view\nfloat32 min_range\nfloat32 max_range\nfloat32 range\n",
    ),
    (
        "sensor_msgs/msg/RegionOfInterest",
        "uint32 x_offset\nuint32 y_offset\nuint32 height\nuint32 width\nbool do_rectify\n",
    ),
    (
        "sensor_msgs/msg/RelativeHumidity",
        "std_msgs/Header header\nfloat64 relative_humidity\nfloat64 variance\n",
    ),
    (
        "sensor_msgs/msg/Temperature",
        "std_msgs/Header header\nfloat64 temperature\nfloat64 variance\n",
    ),
    (
        "sensor_msgs/msg/TimeReference",
        "std_msgs/Header header\nbuiltin_interfaces/Time time_ref\nstring source\n",
    ),
    // nav_msgs
    (
        "nav_msgs/msg/GridCells",
        "std_msgs/Header header\nfloat32 cell_width\nfloat32 cell_height\ngeometry_msgs/Point[] cells\n",
    ),
    (
        "nav_msgs/msg/MapMetaData",
        "builtin_interfaces/Time map_load_time\nfloat32 resolution\nuint32 width\nuint32 height\ngeometry_msgs/Pose origin\n",
    ),
    (
        "nav_msgs/msg/OccupancyGrid",
        "std_msgs/Header header\nMapMetaData info\nint8[] data\n",
    ),
    (
        "nav_msgs/msg/Odometry",
        "std_msgs/Header header\nstring child_frame_id\ngeometry_msgs/PoseWithCovariance pose\ngeometry_msgs/TwistWithCovariance twist\n",
    ),
    (
        "nav_msgs/msg/Path",
        "std_msgs/Header header\ngeometry_msgs/PoseStamped[] poses\n",
    ),
    // diagnostic_msgs
    (
        "diagnostic_msgs/msg/DiagnosticArray",
        "std_msgs/Header header\nDiagnosticStatus[] status\n",
    ),
    (
        "diagnostic_msgs/msg/DiagnosticStatus",
        "byte OK=0\nbyte WARN=1\nbyte ERROR=2\nbyte STALE=3\nbyte level\nstring name\nstring message\nstring hardware_id\nKeyValue[] values\n",
    ),
    (
        "diagnostic_msgs/msg/KeyValue",
        "string key\nstring value\n",
    ),
    // tf2_msgs
    (
        "tf2_msgs/msg/TF2Error",
        "uint8 NO_ERROR=0\nuint8 LOOKUP_ERROR=1\nuint8 CONNECTIVITY_ERROR=2\nuint8 EXTRAPOLATION_ERROR=3\nuint8 INVALID_ARGUMENT_ERROR=4\nuint8 TIMEOUT_ERROR=5\nuint8 TRANSFORM_ERROR=6\nuint8 error\nstring error_string\n",
    ),
    (
        "tf2_msgs/msg/TFMessage",
        "geometry_msgs/TransformStamped[] transforms\n",
    ),
    // trajectory_msgs
    (
        "trajectory_msgs/msg/JointTrajectory",
        "std_msgs/Header header\nstring[] joint_names\nJointTrajectoryPoint[] points\n",
    ),
    (
        "trajectory_msgs/msg/JointTrajectoryPoint",
        "float64[] positions\nfloat64[] velocities\nfloat64[] accelerations\nfloat64[] effort\nduration time_from_start\n",
    ),
    (
        "trajectory_msgs/msg/MultiDOFJointTrajectory",
        "std_msgs/Header header\nstring[] joint_names\nMultiDOFJointTrajectoryPoint[] points\n",
    ),
    (
        "trajectory_msgs/msg/MultiDOFJointTrajectoryPoint",
        "geometry_msgs/Transform[] transforms\ngeometry_msgs/Twist[] velocities\ngeometry_msgs/Twist[] accelerations\nduration time_from_start\n",
    ),
    // shape_msgs
    (
        "shape_msgs/msg/Mesh",
        "MeshTriangle[] triangles\ngeometry_msgs/Point[] vertices\n",
    ),
    (
        "shape_msgs/msg/MeshTriangle",
        "uint32[3] vertex_indices\n",
    ),
    ("shape_msgs/msg/Plane", "float64[4] coef\n"),
    (
        "shape_msgs/msg/SolidPrimitive",
        "uint8 BOX=1\nuint8 SPHERE=2\nuint8 CYLINDER=3\nuint8 CONE=4\nuint8 BOX_X=0\nuint8 BOX_Y=1\nuint8 BOX_Z=2\nuint8 SPHERE_RADIUS=0\nuint8 CYLINDER_HEIGHT=0\nuint8 CYLINDER_RADIUS=1\nuint8 CONE_HEIGHT=0\nuint8 CONE_RADIUS=1\nuint8 type\nfloat64[] dimensions\n",
    ),
    // stereo_msgs
    (
        "stereo_msgs/msg/DisparityImage",
        "std_msgs/Header header\nsensor_msgs/Image image\nfloat32 f\nfloat32 t\nsensor_msgs/RegionOfInterest valid_window\nfloat32 min_disparity\nfloat32 max_disparity\nfloat32 delta_d\n",
    ),
    // visualization_msgs
    (
        "visualization_msgs/msg/Marker",
        "int32 ARROW=0\nint32 CUBE=1\nint32 SPHERE=2\nint32 CYLINDER=3\nint32 LINE_STRIP=4\nint32 LINE_LIST=5\nint32 CUBE_LIST=6\nint32 SPHERE_LIST=7\nint32 POINTS=8\nint32 TEXT_VIEW_FACING=9\nint32 MESH_RESOURCE=10\nint32 TRIANGLE_LIST=11\nint32 ADD=0\nint32 MODIFY=0\nint32 DELETE=2\nint32 DELETEALL=3\nstd_msgs/Header header\nstring ns\nint32 id\nint32 type\nint32 action\ngeometry_msgs/Pose pose\ngeometry_msgs/Vector3 scale\nstd_msgs/ColorRGBA color\nduration lifetime\nbool frame_locked\ngeometry_msgs/Point[] points\nstd_msgs/ColorRGBA[] colors\nstring text\nstring mesh_resource\nbool mesh_use_embedded_materials\n",
    ),
    (
        "visualization_msgs/msg/MarkerArray",
        "Marker[] markers\n",
    ),
    (
        "visualization_msgs/msg/MenuEntry",
        "uint8 FEEDBACK=0\nuint8 ROSRUN=1\nuint8 ROSLAUNCH=2\nuint32 id\nuint32 parent_id\nstring title\nstring command\nuint8 command_type\n",
    ),
    // lifecycle_msgs
    (
        "lifecycle_msgs/msg/State",
        "uint8 PRIMARY_STATE_UNKNOWN=0\nuint8 PRIMARY_STATE_UNCONFIGURED=1\nuint8 PRIMARY_STATE_INACTIVE=2\nuint8 PRIMARY_STATE_ACTIVE=3\nuint8 PRIMARY_STATE_FINALIZED=4\nuint8 TRANSITION_STATE_CONFIGURING=10\nuint8 TRANSITION_STATE_CLEANINGUP=11\nuint8 TRANSITION_STATE_SHUTTINGDOWN=12\nuint8 TRANSITION_STATE_ACTIVATING=13\nuint8 TRANSITION_STATE_DEACTIVATING=14\nuint8 TRANSITION_STATE_ERRORPROCESSING=15\nuint8 id\nstring label\n",
    ),
    (
        "lifecycle_msgs/msg/Transition",
        "uint8 TRANSITION_CREATE=0\nuint8 TRANSITION_CONFIGURE=1\nuint8 TRANSITION_CLEANUP=2\nuint8 TRANSITION_ACTIVATE=3\nuint8 TRANSITION_DEACTIVATE=4\nuint8 id\nstring label\n",
    ),
    (
        "lifecycle_msgs/msg/TransitionDescription",
        "Transition transition\nState start_state\nState goal_state\n",
    ),
    (
        "lifecycle_msgs/msg/TransitionEvent",
        "uint64 timestamp\nTransition transition\nState start_state\nState goal_state\n",
    ),
    // rcl_interfaces
    (
        "rcl_interfaces/msg/FloatingPointRange",
        "float64 from_value\nfloat64 to_value\nfloat64 step\n",
    ),
    (
        "rcl_interfaces/msg/IntegerRange",
        "int64 from_value\nint64 to_value\nuint64 step\n",
    ),
    (
        "rcl_interfaces/msg/ListParametersResult",
        "string[] names\nstring[] prefixes\n",
    ),
    (
        "rcl_interfaces/msg/Log",
        "byte DEBUG=10\nbyte INFO=20\nbyte WARN=30\nbyte ERROR=40\nbyte FATAL=50\nbuiltin_interfaces/Time stamp\nuint8 level\nstring name\nstring msg\nstring file\nstring function\nuint32 line\n",
    ),
    (
        "rcl_interfaces/msg/Parameter",
        "string name\nParameterValue value\n",
    ),
    (
        "rcl_interfaces/msg/ParameterDescriptor",
        "string name\nuint8 type\nstring description\nstring additional_constraints\nbool read_only\nFloatingPointRange[] floating_point_range\nIntegerRange[] integer_range\n",
    ),
    (
        "rcl_interfaces/msg/ParameterEvent",
        "builtin_interfaces/Time stamp\nstring node\nParameter[] new_parameters\nParameter[] changed_parameters\nParameter[] deleted_parameters\n",
    ),
    (
        "rcl_interfaces/msg/ParameterEventDescriptors",
        "ParameterDescriptor[] new_parameters\nParameterDescriptor[] changed_parameters\nParameterDescriptor[] deleted_parameters\n",
    ),
    (
        "rcl_interfaces/msg/ParameterType",
        "uint8 PARAMETER_NOT_SET=0\nuint8 PARAMETER_BOOL=1\nuint8 PARAMETER_INTEGER=2\nuint8 PARAMETER_DOUBLE=3\nuint8 PARAMETER_STRING=4\nuint8 PARAMETER_BYTE_ARRAY=5\nuint8 PARAMETER_BOOL_ARRAY=6\nuint8 PARAMETER_INTEGER_ARRAY=7\nuint8 PARAMETER_DOUBLE_ARRAY=8\nuint8 PARAMETER_STRING_ARRAY=9\n",
    ),
    (
        "rcl_interfaces/msg/ParameterValue",
        "uint8 type\nbool bool_value\nint64 integer_value\nfloat64 double_value\nstring string_value\nbyte[] byte_array_value\nbool[] bool_array_value\nint64[] integer_array_value\nfloat64[] double_array_value\nstring[] string_array_value\n",
    ),
    (
        "rcl_interfaces/msg/SetParametersResult",
        "bool successful\nstring reason\n",
    ),
    // rosgraph_msgs
    ("rosgraph_msgs/msg/Clock", "builtin_interfaces/Time clock\n"),
    // rmw_dds_common
    ("rmw_dds_common/msg/Gid", "uint8[24] data\n"),
    (
        "rmw_dds_common/msg/NodeEntitiesInfo",
        "string node_namespace\nstring node_name\nGid[] reader_gid_seq\nGid[] writer_gid_seq\n",
    ),
    (
        "rmw_dds_common/msg/ParticipantEntitiesInfo",
        "Gid gid\nNodeEntitiesInfo[] node_entities_info_seq\n",
    ),
    // statistics_msgs
    (
        "statistics_msgs/msg/MetricsMessage",
        "string measurement_source_name\nstring metrics_source\nstring unit\nbuiltin_interfaces/Time window_start\nbuiltin_interfaces/Time window_stop\nStatisticDataPoint[] statistics\n",
    ),
    (
        "statistics_msgs/msg/StatisticDataPoint",
        "uint8 data_type\nfloat64 data\n",
    ),
    (
        "statistics_msgs/msg/StatisticDataType",
        "uint8 STATISTICS_DATA_TYPE_UNINITIALIZED=0\nuint8 STATISTICS_DATA_TYPE_AVERAGE=1\nuint8 STATISTICS_DATA_TYPE_MINIMUM=2\nuint8 STATISTICS_DATA_TYPE_MAXIMUM=3\nuint8 STATISTICS_DATA_TYPE_STANDARD_DEVIATION=4\nuint8 STATISTICS_DATA_TYPE_SAMPLE_COUNT=5\n",
    ),
    // unique_identifier_msgs
    ("unique_identifier_msgs/msg/UUID", "uint8[16] uuid\n"),
    // libstatistics_collector
    (
        "libstatistics_collector/msg/DummyMessage",
        "std_msgs/Header header\nuint64 data\n",
    ),
];
